//! Acquisition loop configuration types

use std::time::Duration;

/// What the loop does after a poll that returned no frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleBackoff {
    /// Poll again immediately (lowest latency, one core at 100%)
    Spin,
    /// Yield the time slice to the scheduler (default)
    Yield,
    /// Sleep for a fixed duration
    Sleep(Duration),
}

impl IdleBackoff {
    pub fn idle(&self) {
        match self {
            IdleBackoff::Spin => std::hint::spin_loop(),
            IdleBackoff::Yield => std::thread::yield_now(),
            IdleBackoff::Sleep(duration) => std::thread::sleep(*duration),
        }
    }
}

/// Configuration for the acquisition pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Capacity of the internally owned image queue
    pub queue_capacity: usize,
    /// Successful enqueues between two "new images ready" notifications
    pub pair_size: usize,
    pub idle_backoff: IdleBackoff,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 2,
            pair_size: 2,
            idle_backoff: IdleBackoff::Yield,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    queue_capacity: Option<usize>,
    pair_size: Option<usize>,
    idle_backoff: Option<IdleBackoff>,
}

impl PipelineConfigBuilder {
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn pair_size(mut self, pair_size: usize) -> Self {
        self.pair_size = Some(pair_size);
        self
    }

    pub fn idle_backoff(mut self, backoff: IdleBackoff) -> Self {
        self.idle_backoff = Some(backoff);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            queue_capacity: self.queue_capacity.unwrap_or(default.queue_capacity).max(1),
            pair_size: self.pair_size.unwrap_or(default.pair_size).max(1),
            idle_backoff: self.idle_backoff.unwrap_or(default.idle_backoff),
        }
    }
}

/// Why the acquisition loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// Stop was requested
    Stopped,
    /// A poll or conversion error ended the loop
    Failed(String),
}
