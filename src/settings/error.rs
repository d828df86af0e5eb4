use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Settings file {} does not hold a JSON object", .0.display())]
    NotAnObject(PathBuf),

    #[error("Invalid value for settings key '{key}': {source}")]
    InvalidValue {
        key: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Settings file watcher is already running")]
    WatcherAlreadyRunning,

    #[error("Settings file watcher is not running")]
    WatcherNotRunning,

    #[error("Settings file watcher thread panicked")]
    WatcherPanicked,

    #[error("Failed to spawn settings file watcher: {0}")]
    Spawn(std::io::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
