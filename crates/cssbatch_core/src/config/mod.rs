//! Configuration for cssbatch runs.
//!
//! This module provides:
//! - TOML run files with `[options]`, `[logging]` and `[[files]]` sections
//! - Normalization of multi-shape options into immutable [`Settings`]
//! - Atomic creation of a default run file
//!
//! # Example
//!
//! ```no_run
//! use cssbatch_core::config::ConfigManager;
//!
//! let mut manager = ConfigManager::new("cssbatch.toml");
//! let config = manager.load_or_create().unwrap();
//! let settings = config.options.resolve();
//! println!("sequential: {}", settings.sequential);
//! ```

mod manager;
mod options;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use options::{
    Annotation, DiffOption, DiffSetting, EngineSettings, LoggingSettings, MapConfig, MapDetails,
    MapOption, MapSetting, Options, RunConfig, Settings, Switch,
};
