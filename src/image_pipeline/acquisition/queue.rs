use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::image_pipeline::debayer::DisplayImage;

/// Bounded FIFO of display images shared between the acquisition loop and
/// any number of consumers. Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct ImageQueue {
    tx: Sender<DisplayImage>,
    rx: Receiver<DisplayImage>,
    capacity: usize,
}

impl ImageQueue {
    /// A capacity of zero is raised to one; a rendezvous queue would drop every image.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Enqueues without blocking. When the queue is full the image is handed back.
    pub fn try_push(&self, image: DisplayImage) -> Result<(), DisplayImage> {
        self.tx.try_send(image).map_err(|e| e.into_inner())
    }

    pub fn try_pop(&self) -> Option<DisplayImage> {
        self.rx.try_recv().ok()
    }

    pub fn pop_timeout(&self, timeout: Duration) -> Option<DisplayImage> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Removes everything currently queued and returns how many images were discarded.
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }

    /// Receiving end for consumers that want to `select!` on the queue.
    pub fn receiver(&self) -> Receiver<DisplayImage> {
        self.rx.clone()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rx.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ImageQueue {
    fn default() -> Self {
        Self::new(2)
    }
}

impl std::fmt::Debug for ImageQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
