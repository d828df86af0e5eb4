use serde::Deserialize;

use crate::camera::error::{CameraError, Result};
use crate::camera::sdk::{CameraSession, OperationMode, TriggerPolarity};
use crate::settings::{SettingsError, SettingsStore};

/// Key of the settings object holding the camera parameters
pub const SETTINGS_KEY: &str = "settings";

/// Capture parameters read from the `settings` object of the settings file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraParameters {
    /// Exposure time in microseconds
    #[serde(rename = "exposureTime_us")]
    pub exposure_time_us: u64,
    /// Frames acquired per trigger, zero for unlimited
    #[serde(default = "default_frames_per_trigger")]
    pub frames_per_trigger: u32,
    #[serde(default)]
    pub operation_mode: OperationMode,
    #[serde(default)]
    pub trigger_polarity: TriggerPolarity,
    /// Number of frame buffers allocated when arming
    #[serde(default = "default_arm_frame_count")]
    pub arm_frame_count: u32,
}

fn default_frames_per_trigger() -> u32 {
    1
}

fn default_arm_frame_count() -> u32 {
    2
}

impl CameraParameters {
    pub fn from_settings(settings: &SettingsStore) -> Result<Self> {
        match settings.get_as::<Self>(SETTINGS_KEY) {
            Ok(Some(parameters)) => Ok(parameters),
            Ok(None) => Err(CameraError::MissingSettings),
            Err(SettingsError::InvalidValue { source, .. }) => {
                Err(CameraError::InvalidSettings(source.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Applies everything except arming.
    pub fn apply<S: CameraSession>(&self, session: &mut S) -> Result<()> {
        session.set_exposure_time_us(self.exposure_time_us)?;
        session.set_frames_per_trigger(self.frames_per_trigger)?;
        session.set_operation_mode(self.operation_mode)?;
        session.set_trigger_polarity(self.trigger_polarity)?;
        Ok(())
    }
}
