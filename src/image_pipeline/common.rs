//! Common utilities module
//!
//! Shared error type for frame sources, color conversion and the acquisition loop.

pub mod error;

pub use error::{AcquisitionError, Result};
