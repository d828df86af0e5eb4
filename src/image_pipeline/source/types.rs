//! Frame and sensor description types

use std::time::Duration;

use crate::image_pipeline::common::error::{AcquisitionError, Result};

/// Kind of image sensor behind a frame source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Single channel sensor, frames are displayed as grayscale
    Monochrome,
    /// Color filter array sensor, frames need demosaicing
    Bayer,
}

/// Color of the top-left 2x2 block of a Bayer sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfaPhase {
    #[default]
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

pub type Matrix3 = [[f32; 3]; 3];

pub const IDENTITY_MATRIX: Matrix3 = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

/// Calibration matrices reported by a color camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCalibration {
    pub color_correction: Matrix3,
    pub white_balance: Matrix3,
}

impl Default for ColorCalibration {
    fn default() -> Self {
        Self {
            color_correction: IDENTITY_MATRIX,
            white_balance: IDENTITY_MATRIX,
        }
    }
}

/// Static description of the sensor a frame source reads from
#[derive(Debug, Clone, PartialEq)]
pub struct SensorInfo {
    pub kind: SensorKind,
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Bits per sample produced by the sensor (8..=16)
    pub bit_depth: u32,
    pub cfa_phase: CfaPhase,
    pub calibration: ColorCalibration,
}

impl SensorInfo {
    pub fn monochrome(width: usize, height: usize, bit_depth: u32) -> Self {
        Self {
            kind: SensorKind::Monochrome,
            width,
            height,
            bit_depth,
            cfa_phase: CfaPhase::default(),
            calibration: ColorCalibration::default(),
        }
    }

    pub fn bayer(width: usize, height: usize, bit_depth: u32) -> Self {
        Self {
            kind: SensorKind::Bayer,
            ..Self::monochrome(width, height, bit_depth)
        }
    }
}

/// One captured exposure, owned by the acquisition loop until it is converted
#[derive(Debug, Clone)]
pub struct Frame {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Bits per sample (e.g., 8, 10, 12 or 16)
    pub bit_depth: u32,
    /// Row-major single channel samples
    pub data: Vec<u16>,
    pub sensor_kind: SensorKind,
    /// Sequence number assigned by the source
    pub frame_count: u64,
    /// Capture time relative to the start of acquisition
    pub timestamp: Duration,
}

impl Frame {
    /// Checks that the buffer matches the advertised geometry.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AcquisitionError::InvalidDimensions(self.width, self.height));
        }
        let expected = self.width * self.height;
        if self.data.len() != expected {
            return Err(AcquisitionError::BufferSizeMismatch {
                width: self.width,
                height: self.height,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}
