use std::path::Path;
use std::sync::{Arc, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use tracing::{debug, info, warn};

use crate::settings::error::{Result, SettingsError};
use crate::settings::store::Shared;

const THREAD_NAME: &str = "file_watcher";

/// Background poller that reloads the settings when the file text changes.
pub(crate) struct FileWatcher {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl FileWatcher {
    pub(crate) fn spawn(shared: Arc<Shared>, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded(1);
        // Baseline is taken before returning so edits made right after
        // start_watch are detected.
        let (last_seen, _) = read_current(&shared);

        let handle = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || watch_loop(&shared, interval, last_seen, &stop_rx))
            .map_err(SettingsError::Spawn)?;

        Ok(Self { stop_tx, handle })
    }

    pub(crate) fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    pub(crate) fn join(self) -> Result<()> {
        self.handle.join().map_err(|_| SettingsError::WatcherPanicked)
    }
}

fn watch_loop(shared: &Shared, interval: Duration, mut last_seen: Option<String>, stop_rx: &Receiver<()>) {
    loop {
        let (content, saved_by_us) = read_current(shared);
        if content != last_seen {
            last_seen = content;
            if saved_by_us {
                debug!("File rewritten by save, nothing to reload");
            } else {
                info!("File was modified! Reloading it...");
                match shared.reload() {
                    Ok(()) => shared.mark_reloaded(),
                    Err(e) => warn!("Keeping previous settings: {}", e),
                }
            }
        }

        let stop = !matches!(stop_rx.recv_timeout(interval), Err(RecvTimeoutError::Timeout));
        shared.clear_updated();
        if stop {
            break;
        }
    }
    debug!("File watcher thread exited");
}

/// Reads the file text and reports whether it is exactly what the last
/// `save` wrote. A match consumes the recorded write.
fn read_current(shared: &Shared) -> (Option<String>, bool) {
    let mut own_write = shared.own_write.lock().unwrap_or_else(PoisonError::into_inner);
    let content = read_raw(&shared.path);
    let saved_by_us = match (&content, own_write.as_deref()) {
        (Some(text), Some(written)) => text.as_bytes() == written,
        _ => false,
    };
    if saved_by_us {
        *own_write = None;
    }
    (content, saved_by_us)
}

fn read_raw(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(path = %path.display(), "Settings file unreadable: {}", e);
            None
        }
    }
}
