//! Color conversion module: Bayer frames to display-ready RGB24 images

mod converter;
pub mod cpu_debayer;
pub mod types;

pub use converter::{ColorConverter, ConverterLease};
pub use cpu_debayer::CpuDebayer;
pub use types::{DisplayImage, DisplayPixels};
