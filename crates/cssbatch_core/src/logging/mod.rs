//! Logging infrastructure for cssbatch.
//!
//! This module provides:
//! - A per-run logger with tracing, file and callback output
//! - A tail buffer of recent lines for diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use cssbatch_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("styles", LogConfig::default(), None);
//! logger.warn("Source file missing.css not found.");
//! logger.ok("1 processed stylesheet created.");
//! ```

mod run_logger;
mod types;

pub use run_logger::RunLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Install the process-wide subscriber for a host that has no tracing setup
/// of its own.
///
/// `RUST_LOG` wins over the run file's `[logging] level`. Returns `false`
/// when a global subscriber was already installed, in which case nothing
/// changes.
pub fn init_tracing(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_filter()));

    let layer = fmt::layer().with_target(false);
    let installed = if settings.show_timestamps {
        tracing_subscriber::registry().with(filter).with(layer).try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.without_time())
            .try_init()
    };
    installed.is_ok()
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
