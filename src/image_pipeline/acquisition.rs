mod notify;
mod pipeline;
mod queue;
mod stats;
mod types;


pub use notify::{PairCounter, PairNotifier};
pub use pipeline::AcquisitionPipeline;
pub use queue::ImageQueue;
pub use stats::{AcquisitionStats, StatsSnapshot, Timer};
pub use types::{IdleBackoff, LoopExit, PipelineConfig, PipelineConfigBuilder};
