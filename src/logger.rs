//! Process-wide `tracing` setup for the acquisition binary.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Installs the global subscriber with the default directives. A subscriber
/// that is already installed is left in place.
pub fn init() {
    let _ = try_init(DEFAULT_DIRECTIVES);
}

/// Installs the global subscriber. `RUST_LOG` overrides `default_directives`.
///
/// The acquisition loop and the settings watcher log from their own threads,
/// so thread names are always printed. Span close events (with their busy
/// time) are only emitted when the filter lets debug output through.
pub fn try_init(default_directives: &str) -> Result<(), TryInitError> {
    let env_filter = build_filter(default_directives);
    let span_events = if shows_debug(&env_filter) {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}

fn build_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

fn shows_debug(filter: &EnvFilter) -> bool {
    filter
        .max_level_hint()
        .is_some_and(|level| level >= LevelFilter::DEBUG)
}
