//! Image acquisition pipeline module
//!
//! Frames are polled from a non-blocking source, converted to display-ready
//! images (demosaiced RGB24 or grayscale pass-through) and published to a
//! bounded queue that drops new images instead of blocking capture.

pub mod acquisition;
pub mod common;
pub mod debayer;
pub mod source;

pub use common::{
    AcquisitionError,
    Result,
};

pub use source::{
    CfaPhase,
    ColorCalibration,
    Frame,
    FrameSource,
    SensorInfo,
    SensorKind,
};

pub use debayer::{
    ColorConverter,
    CpuDebayer,
    DisplayImage,
    DisplayPixels,
};

pub use acquisition::{
    AcquisitionPipeline,
    IdleBackoff,
    ImageQueue,
    LoopExit,
    PairNotifier,
    PipelineConfig,
    StatsSnapshot,
};
