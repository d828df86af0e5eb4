use crossbeam_channel::Sender;

/// Receives the "new image pair ready" event.
///
/// Called on the acquisition thread; GUI adapters must marshal to their own
/// event loop.
pub trait PairNotifier: Send + Sync {
    fn notify(&self, new_image: bool);
}

impl<F> PairNotifier for F
where
    F: Fn(bool) + Send + Sync,
{
    fn notify(&self, new_image: bool) {
        self(new_image)
    }
}

/// Forwards events to a channel without blocking; events are lost while the
/// channel is full.
impl PairNotifier for Sender<bool> {
    fn notify(&self, new_image: bool) {
        let _ = self.try_send(new_image);
    }
}

/// Counts successful enqueues and reports when a full group has been queued.
#[derive(Debug)]
pub struct PairCounter {
    count: usize,
    pair_size: usize,
}

impl PairCounter {
    pub fn new(pair_size: usize) -> Self {
        Self {
            count: 0,
            pair_size: pair_size.max(1),
        }
    }

    /// Records one successful enqueue. Returns true and restarts the count
    /// when the group is complete.
    pub fn record(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.pair_size {
            self.count = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
