use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::settings::error::{Result, SettingsError};
use crate::settings::watcher::FileWatcher;

pub type SettingsMap = Map<String, Value>;

/// Poll interval used when a caller does not pick one.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(2);

const INDENT: &[u8] = b"    ";

/// State shared between the store handle and its watcher thread.
pub(crate) struct Shared {
    pub(crate) path: PathBuf,
    map: RwLock<Arc<SettingsMap>>,
    updated: AtomicBool,
    generation: AtomicU64,
    /// Bytes of the last successful `save`, until the watcher has seen them.
    pub(crate) own_write: Mutex<Option<Vec<u8>>>,
}

impl Shared {
    pub(crate) fn snapshot(&self) -> Arc<SettingsMap> {
        Arc::clone(&*self.map.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swaps in a new map; readers see either the old or the new one whole.
    pub(crate) fn replace(&self, map: SettingsMap) {
        *self.map.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(map);
    }

    pub(crate) fn reload(&self) -> Result<()> {
        let map = load_map(&self.path)?;
        self.replace(map);
        Ok(())
    }

    pub(crate) fn mark_reloaded(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.updated.store(true, Ordering::Release);
    }

    pub(crate) fn clear_updated(&self) {
        self.updated.store(false, Ordering::Release);
    }
}

/// Key/value settings mirrored to a JSON file.
///
/// The in-memory map is the source of truth between saves. An optional
/// watcher thread reloads the whole map when the file's text changes.
pub struct SettingsStore {
    shared: Arc<Shared>,
    seen_generation: AtomicU64,
    watcher: Mutex<Option<FileWatcher>>,
}

impl SettingsStore {
    /// Loads the file at `path`. A missing file yields an empty store.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let map = load_map(&path)?;
        info!(keys = map.len(), "Settings loaded");

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                map: RwLock::new(Arc::new(map)),
                updated: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                own_write: Mutex::new(None),
            }),
            seen_generation: AtomicU64::new(0),
            watcher: Mutex::new(None),
        })
    }

    /// Loads the file and, when `watch` is given, starts a watcher with that interval.
    pub fn open<P: AsRef<Path>>(path: P, watch: Option<Duration>) -> Result<Self> {
        let store = Self::load(path)?;
        if let Some(interval) = watch {
            store.start_watch(interval)?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.shared.snapshot().get(key).cloned()
    }

    /// Deserializes the value under `key`. Returns `Ok(None)` when unset.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(|source| SettingsError::InvalidValue {
                key: key.to_string(),
                source,
            })
    }

    /// Updates the in-memory map only; call `save` to persist.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut guard = self.shared.map.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut *guard).insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut guard = self.shared.map.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut *guard).remove(key)
    }

    /// Immutable view of the whole map at this instant.
    pub fn snapshot(&self) -> Arc<SettingsMap> {
        self.shared.snapshot()
    }

    /// Overwrites the backing file with the whole in-memory map. A running
    /// watcher does not report the written text as an update.
    #[instrument(skip_all, fields(path = %self.shared.path.display()))]
    pub fn save(&self) -> Result<()> {
        let map = self.snapshot();
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        (*map).serialize(&mut serializer)?;

        // held across the write so the watcher never reads a half-saved file
        let mut own_write = self.shared.own_write.lock().unwrap_or_else(PoisonError::into_inner);
        std::fs::write(&self.shared.path, &buffer).map_err(|source| SettingsError::Io {
            path: self.shared.path.clone(),
            source,
        })?;
        *own_write = Some(buffer);
        debug!(keys = map.len(), "Settings saved");
        Ok(())
    }

    /// Re-reads the backing file and replaces the map wholesale.
    pub fn reload(&self) -> Result<()> {
        self.shared.reload()
    }

    /// True from the moment the watcher reloads the file until the end of its
    /// next sleep. Callers polling slower than the watch interval can miss it;
    /// use `take_update` or `reload_generation` for a reliable signal.
    pub fn is_updated(&self) -> bool {
        self.shared.updated.load(Ordering::Acquire)
    }

    /// Number of reloads performed by the watcher so far.
    pub fn reload_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Returns true once for every batch of watcher reloads not yet observed
    /// through this method.
    pub fn take_update(&self) -> bool {
        let current = self.reload_generation();
        self.seen_generation.swap(current, Ordering::AcqRel) != current
    }

    pub fn start_watch(&self, interval: Duration) -> Result<()> {
        let mut slot = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(SettingsError::WatcherAlreadyRunning);
        }
        *slot = Some(FileWatcher::spawn(Arc::clone(&self.shared), interval)?);
        info!(interval_ms = interval.as_millis() as u64, "Start file watcher thread");
        Ok(())
    }

    /// Signals the watcher to exit; the pending sleep is cut short.
    pub fn stop_watch(&self) -> Result<()> {
        let slot = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        let watcher = slot.as_ref().ok_or(SettingsError::WatcherNotRunning)?;
        watcher.stop();
        info!("Stop file watcher thread");
        Ok(())
    }

    /// Waits for the watcher thread to exit. Blocks until `stop_watch` is called.
    pub fn join_watch(&self) -> Result<()> {
        let watcher = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(SettingsError::WatcherNotRunning)?;
        watcher.join()
    }

    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Drop for SettingsStore {
    fn drop(&mut self) {
        let watcher = self.watcher.get_mut().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(watcher) = watcher {
            watcher.stop();
            let _ = watcher.join();
        }
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("path", &self.shared.path)
            .field("keys", &self.snapshot().len())
            .field("generation", &self.reload_generation())
            .finish()
    }
}

/// Reads and parses the settings file; a missing file is an empty map.
pub(crate) fn load_map(path: &Path) -> Result<SettingsMap> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Settings file not found, starting empty");
            return Ok(SettingsMap::new());
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let value: Value = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SettingsError::NotAnObject(path.to_path_buf())),
    }
}
