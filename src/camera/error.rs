use thiserror::Error;

use crate::image_pipeline::AcquisitionError;
use crate::settings::SettingsError;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera not found: {0}")]
    DeviceNotFound(String),

    #[error("Camera SDK error: {0}")]
    Sdk(String),

    #[error("No \"settings\" object with camera parameters in the settings file")]
    MissingSettings,

    #[error("Invalid camera settings: {0}")]
    InvalidSettings(String),

    #[error("Camera handler was already disposed")]
    Disposed,

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
}

pub type Result<T> = std::result::Result<T, CameraError>;
