use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::source::types::{Frame, SensorInfo};

/// Non-blocking producer of frames, usually an armed camera session.
pub trait FrameSource: Send {
    /// Returns the next pending frame, or `None` when nothing is ready yet.
    fn poll_frame(&mut self) -> Result<Option<Frame>>;

    fn sensor_info(&self) -> SensorInfo;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn poll_frame(&mut self) -> Result<Option<Frame>> {
        (**self).poll_frame()
    }

    fn sensor_info(&self) -> SensorInfo {
        (**self).sensor_info()
    }
}
