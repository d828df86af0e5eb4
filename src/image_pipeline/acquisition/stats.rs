use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

/// Counters updated by the acquisition thread and read from anywhere.
#[derive(Debug, Default)]
pub struct AcquisitionStats {
    frames_polled: AtomicU64,
    images_enqueued: AtomicU64,
    images_dropped: AtomicU64,
    pairs_notified: AtomicU64,
    dimension_changes: AtomicU64,
    conversion_nanos: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_polled: u64,
    pub images_enqueued: u64,
    pub images_dropped: u64,
    pub pairs_notified: u64,
    pub dimension_changes: u64,
    pub conversion_time: Duration,
}

impl AcquisitionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_polled(&self) {
        self.frames_polled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_enqueued(&self) {
        self.images_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.images_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pair(&self) {
        self.pairs_notified.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dimension_change(&self) {
        self.dimension_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_conversion_time(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.conversion_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_polled: self.frames_polled.load(Ordering::Relaxed),
            images_enqueued: self.images_enqueued.load(Ordering::Relaxed),
            images_dropped: self.images_dropped.load(Ordering::Relaxed),
            pairs_notified: self.pairs_notified.load(Ordering::Relaxed),
            dimension_changes: self.dimension_changes.load(Ordering::Relaxed),
            conversion_time: Duration::from_nanos(self.conversion_nanos.load(Ordering::Relaxed)),
        }
    }
}

impl StatsSnapshot {
    pub fn mean_conversion_time(&self) -> Duration {
        if self.frames_polled == 0 {
            Duration::ZERO
        } else {
            let nanos = self.conversion_time.as_nanos() / u128::from(self.frames_polled);
            Duration::from_nanos(nanos as u64)
        }
    }

    pub fn log_summary(&self) {
        info!(
            polled = self.frames_polled,
            enqueued = self.images_enqueued,
            dropped = self.images_dropped,
            pairs = self.pairs_notified,
            dimension_changes = self.dimension_changes,
            "Acquisition summary: mean conversion {:.3}ms",
            self.mean_conversion_time().as_secs_f64() * 1000.0
        );
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}
