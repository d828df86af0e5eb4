//! Frame source module
//!
//! Describes frames and the non-blocking capability the acquisition loop polls.

mod reader;
pub mod types;

pub use reader::FrameSource;
pub use types::{CfaPhase, ColorCalibration, Frame, Matrix3, SensorInfo, SensorKind, IDENTITY_MATRIX};
