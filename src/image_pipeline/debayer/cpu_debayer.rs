use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::{debug, info};

use crate::image_pipeline::common::error::{AcquisitionError, Result};
use crate::image_pipeline::debayer::converter::ColorConverter;
use crate::image_pipeline::source::{CfaPhase, ColorCalibration, Matrix3, SensorInfo};

/// CPU color processor: linear demosaic followed by white balance and color
/// correction, scaled down to 8 bits per channel.
pub struct CpuDebayer {
    cfa_phase: CfaPhase,
    bit_depth: u32,
    /// color_correction * white_balance
    color_matrix: Matrix3,
    disposed: bool,
}

impl CpuDebayer {
    pub fn new(cfa_phase: CfaPhase, calibration: ColorCalibration, bit_depth: u32) -> Self {
        let color_matrix = multiply(&calibration.color_correction, &calibration.white_balance);
        Self {
            cfa_phase,
            bit_depth: bit_depth.clamp(1, 16),
            color_matrix,
            disposed: false,
        }
    }

    pub fn for_sensor(sensor: &SensorInfo) -> Self {
        info!(
            "Creating CPU color processor: {}x{}, {} bit, CFA={:?}",
            sensor.width, sensor.height, sensor.bit_depth, sensor.cfa_phase
        );
        Self::new(sensor.cfa_phase, sensor.calibration, sensor.bit_depth)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl ColorConverter for CpuDebayer {
    fn transform_to_24(&mut self, buffer: &[u16], width: usize, height: usize) -> Result<Vec<u8>> {
        if self.disposed {
            return Err(AcquisitionError::ConverterDisposed);
        }
        // Linear demosaic needs at least one full 2x2 block
        if width < 2 || height < 2 {
            return Err(AcquisitionError::InvalidDimensions(width, height));
        }
        let expected = width * height;
        if buffer.len() != expected {
            return Err(AcquisitionError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: buffer.len(),
            });
        }

        // bayer crate only supports 8 and 16 bit
        let (bayer_depth, raster_depth, bytes_per_pixel) = if self.bit_depth <= 8 {
            (BayerDepth::Depth8, RasterDepth::Depth8, 1)
        } else {
            (BayerDepth::Depth16LE, RasterDepth::Depth16, 2)
        };

        let bayer_bytes: Vec<u8> = if self.bit_depth <= 8 {
            buffer.iter().map(|&val| val.min(u8::MAX as u16) as u8).collect()
        } else {
            buffer.iter().flat_map(|&val| val.to_le_bytes()).collect()
        };

        let mut output_buf = vec![0u8; width * height * 3 * bytes_per_pixel];
        let mut cursor = Cursor::new(&bayer_bytes[..]);

        debug!(
            "Running demosaic {}x{} depth={:?} CFA={:?}",
            width, height, bayer_depth, self.cfa_phase
        );

        {
            let mut output_raster = RasterMut::new(width, height, raster_depth, &mut output_buf);
            bayer::run_demosaic(
                &mut cursor,
                bayer_depth,
                to_cfa(self.cfa_phase),
                Demosaic::Linear,
                &mut output_raster,
            )
            .map_err(|e| AcquisitionError::Conversion(format!("Demosaic failed: {:?}", e)))?;
        }

        let max_value = ((1u32 << self.bit_depth) - 1) as f32;
        let m = &self.color_matrix;

        let rgb: Vec<u8> = output_buf
            .chunks_exact(bytes_per_pixel * 3)
            .flat_map(|pixel_bytes| {
                let (r_raw, g_raw, b_raw) = if bytes_per_pixel == 1 {
                    (pixel_bytes[0] as f32, pixel_bytes[1] as f32, pixel_bytes[2] as f32)
                } else {
                    (
                        u16::from_ne_bytes([pixel_bytes[0], pixel_bytes[1]]) as f32,
                        u16::from_ne_bytes([pixel_bytes[2], pixel_bytes[3]]) as f32,
                        u16::from_ne_bytes([pixel_bytes[4], pixel_bytes[5]]) as f32,
                    )
                };

                let r = r_raw / max_value;
                let g = g_raw / max_value;
                let b = b_raw / max_value;

                let r_out = m[0][0] * r + m[0][1] * g + m[0][2] * b;
                let g_out = m[1][0] * r + m[1][1] * g + m[1][2] * b;
                let b_out = m[2][0] * r + m[2][1] * g + m[2][2] * b;

                [to_u8(r_out), to_u8(g_out), to_u8(b_out)]
            })
            .collect();

        Ok(rgb)
    }

    fn dispose(&mut self) {
        if !self.disposed {
            debug!("Disposing CPU color processor");
            self.disposed = true;
        }
    }
}

fn to_cfa(phase: CfaPhase) -> CFA {
    match phase {
        CfaPhase::Rggb => CFA::RGGB,
        CfaPhase::Bggr => CFA::BGGR,
        CfaPhase::Grbg => CFA::GRBG,
        CfaPhase::Gbrg => CFA::GBRG,
    }
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn multiply(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0f32; 3]; 3];
    for r in 0..3 {
        for c in 0..3 {
            out[r][c] = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::source::IDENTITY_MATRIX;

    fn center_pixel(rgb: &[u8], width: usize, height: usize) -> [u8; 3] {
        let idx = ((height / 2) * width + width / 2) * 3;
        [rgb[idx], rgb[idx + 1], rgb[idx + 2]]
    }

    #[test]
    fn test_rgb24_output_size() {
        let mut debayer = CpuDebayer::new(CfaPhase::Rggb, ColorCalibration::default(), 8);
        let rgb = debayer.transform_to_24(&vec![128u16; 8 * 6], 8, 6).unwrap();
        assert_eq!(rgb.len(), 8 * 6 * 3);
    }

    #[test]
    fn test_full_scale_12_bit_saturates() {
        let mut debayer = CpuDebayer::new(CfaPhase::Bggr, ColorCalibration::default(), 12);
        let rgb = debayer.transform_to_24(&vec![4095u16; 6 * 6], 6, 6).unwrap();
        assert_eq!(center_pixel(&rgb, 6, 6), [255, 255, 255]);
    }

    #[test]
    fn test_white_balance_applied() {
        let calibration = ColorCalibration {
            color_correction: IDENTITY_MATRIX,
            white_balance: [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        };
        let mut debayer = CpuDebayer::new(CfaPhase::Rggb, calibration, 8);
        let rgb = debayer.transform_to_24(&vec![255u16; 6 * 6], 6, 6).unwrap();
        assert_eq!(center_pixel(&rgb, 6, 6), [0, 255, 255]);
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let mut debayer = CpuDebayer::new(CfaPhase::Rggb, ColorCalibration::default(), 8);
        let result = debayer.transform_to_24(&[0u16; 10], 4, 4);
        assert!(matches!(
            result,
            Err(AcquisitionError::BufferSizeMismatch { expected: 16, actual: 10, .. })
        ));
    }

    #[test]
    fn test_disposed_converter_rejects_frames() {
        let mut debayer = CpuDebayer::new(CfaPhase::Rggb, ColorCalibration::default(), 8);
        debayer.dispose();
        assert!(debayer.is_disposed());
        let result = debayer.transform_to_24(&[0u16; 16], 4, 4);
        assert!(matches!(result, Err(AcquisitionError::ConverterDisposed)));
    }
}
