//! Display-ready image types

use std::time::Duration;

/// Pixel storage of a display image
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayPixels {
    /// Interleaved 8-bit RGB [R, G, B, R, G, B, ...]
    Rgb24(Vec<u8>),
    /// 8-bit grayscale, one sample per pixel
    Gray8(Vec<u8>),
    /// Grayscale at the sensor's native depth, one sample per pixel
    Gray16(Vec<u16>),
}

/// Consumer-ready image built fresh for every frame
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    pub frame_count: u64,
    pub timestamp: Duration,
    pub pixels: DisplayPixels,
}

impl DisplayImage {
    pub fn channels(&self) -> usize {
        match self.pixels {
            DisplayPixels::Rgb24(_) => 3,
            DisplayPixels::Gray8(_) | DisplayPixels::Gray16(_) => 1,
        }
    }

    /// Number of channel values stored (width * height * channels).
    pub fn sample_count(&self) -> usize {
        match &self.pixels {
            DisplayPixels::Rgb24(data) | DisplayPixels::Gray8(data) => data.len(),
            DisplayPixels::Gray16(data) => data.len(),
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self.pixels, DisplayPixels::Rgb24(_))
    }
}
