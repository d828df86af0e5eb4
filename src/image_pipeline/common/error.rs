use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Image acquisition was already started")]
    AlreadyStarted,

    #[error("Image acquisition is not running or was already joined")]
    NotStarted,

    #[error("Image acquisition thread panicked")]
    WorkerPanicked,

    #[error("Frame source error: {0}")]
    Source(String),

    #[error("Color conversion failed: {0}")]
    Conversion(String),

    #[error("Frame buffer holds {actual} samples, expected {expected} for {width}x{height}")]
    BufferSizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Bayer frame received but no color converter is configured")]
    ConverterUnavailable,

    #[error("Color converter was already disposed")]
    ConverterDisposed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AcquisitionError>;
