//! Live camera acquisition: a bounded, drop-on-full image pipeline fed by a
//! camera SDK, and a JSON settings store with an optional file watcher.

pub mod camera;
pub mod image_pipeline;
pub mod logger;
pub mod settings;
