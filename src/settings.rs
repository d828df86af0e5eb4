//! JSON-backed settings store
//!
//! Settings live in memory as a JSON object and are written back only on an
//! explicit save. A background watcher can poll the file and reload the
//! whole map when its text changes on disk.

mod error;
mod store;
mod watcher;


pub use error::{Result, SettingsError};
pub use store::{DEFAULT_WATCH_INTERVAL, SettingsMap, SettingsStore};
