//! Camera control module
//!
//! Vendor SDK capability traits, parameter loading from the settings store,
//! the handler tying an opened camera to the acquisition pipeline, and a
//! simulated SDK.

mod error;
mod handler;
mod parameters;
mod sdk;
pub mod sim;

#[cfg(test)]
mod tests;

pub use error::{CameraError, Result};
pub use handler::{CameraHandler, open_camera};
pub use parameters::{CameraParameters, SETTINGS_KEY};
pub use sdk::{CameraSdk, CameraSession, OperationMode, TriggerPolarity};
pub use sim::{SimulatedCamera, SimulatedCameraSpec, SimulatedCameraState, SimulatedSdk};
