use serde::Deserialize;

use crate::camera::error::Result;
use crate::image_pipeline::FrameSource;

/// How the camera decides when to expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationMode {
    SoftwareTriggered,
    #[default]
    HardwareTriggered,
    Bulb,
}

/// Edge of the hardware trigger input that starts an exposure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerPolarity {
    ActiveHigh,
    #[default]
    ActiveLow,
}

/// Entry point of a vendor camera SDK.
pub trait CameraSdk: Send {
    type Session: CameraSession;

    /// Serial numbers (or other ids) of every camera that can be opened.
    fn discover_available_cameras(&mut self) -> Result<Vec<String>>;

    fn open_camera(&mut self, camera_id: &str) -> Result<Self::Session>;

    fn dispose(&mut self) {}
}

/// An opened camera. Once armed it produces frames through [`FrameSource`].
pub trait CameraSession: FrameSource + 'static {
    fn set_exposure_time_us(&mut self, exposure_time_us: u64) -> Result<()>;

    /// Zero means unlimited.
    fn set_frames_per_trigger(&mut self, frames: u32) -> Result<()>;

    fn set_operation_mode(&mut self, mode: OperationMode) -> Result<()>;

    fn set_trigger_polarity(&mut self, polarity: TriggerPolarity) -> Result<()>;

    /// Allocates `frames_to_buffer` frame buffers and starts accepting triggers.
    fn arm(&mut self, frames_to_buffer: u32) -> Result<()>;

    fn disarm(&mut self) -> Result<()>;

    fn dispose(&mut self) {}
}
