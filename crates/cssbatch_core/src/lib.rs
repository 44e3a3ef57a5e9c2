//! cssbatch core - orchestration for batch stylesheet transformations
//!
//! This crate turns declared file mappings into transformation jobs, runs
//! them through a pluggable engine (sequentially or concurrently), writes
//! the resulting stylesheets, source maps and diffs, and reports a tally.
//! It has no CLI or globbing of its own; a host task-runner drives it.

pub mod artifacts;
pub mod config;
pub mod engine;
pub mod logging;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod test_support;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
