//! Config manager for loading run files.
//!
//! Key features:
//! - Missing keys fall back to defaults on load
//! - A commented default run file can be created on first use
//! - Atomic writes (write to temp file, then rename)

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::options::RunConfig;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads a run file once per run.
pub struct ConfigManager {
    /// Path to the run file.
    config_path: PathBuf,
    /// Loaded configuration.
    config: RunConfig,
}

impl ConfigManager {
    /// Create a new config manager with the given run file path.
    ///
    /// Does not load the file - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            config: RunConfig::default(),
        }
    }

    /// Get the run file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Consume the manager, keeping the configuration.
    pub fn into_config(self) -> RunConfig {
        self.config
    }

    /// Load the run file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<&RunConfig> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.config = toml::from_str(&content)?;
        tracing::debug!(
            "Loaded run file {} ({} mappings)",
            self.config_path.display(),
            self.config.files.len()
        );
        Ok(&self.config)
    }

    /// Load the run file, creating one with defaults if it doesn't exist.
    pub fn load_or_create(&mut self) -> ConfigResult<&RunConfig> {
        if self.config_path.exists() {
            return self.load();
        }

        self.config = RunConfig::default();
        self.save()?;
        tracing::info!("Created default run file {}", self.config_path.display());
        Ok(&self.config)
    }

    /// Save the configuration atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Generate run file content with a short header.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# cssbatch run configuration\n");
        output.push_str("# [options] controls maps, diffs and scheduling;\n");
        output.push_str("# add [[files]] tables with `src = [...]` and an optional `dest`.\n\n");
        output.push_str(&toml::to_string_pretty(&self.config)?);

        Ok(output)
    }

    /// Write content to the run file atomically.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}
