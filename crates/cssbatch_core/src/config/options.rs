//! Run options as written in a run file, and their normalized form.
//!
//! Several options accept more than one shape (`map = true` or a `[map]`
//! table, `diff = true` or `diff = "out.patch"`). The raw shapes are kept in
//! [`Options`] for (de)serialization; [`Options::resolve`] turns them into a
//! [`Settings`] value once per run so nothing downstream re-inspects them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::orchestrator::FileMapping;

/// Complete run file: options, logging and declared file mappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Transformation options.
    #[serde(default)]
    pub options: Options,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Declared source → destination mappings, in run order.
    #[serde(default)]
    pub files: Vec<FileMapping>,
}

/// Raw transformation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Ask the engine to tolerate malformed input.
    #[serde(default)]
    pub safe: bool,

    /// Engine parser name, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,

    /// Engine stringifier name, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stringifier: Option<String>,

    /// Engine syntax name, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,

    /// Fail the run when any engine warning was reported.
    #[serde(default)]
    pub fail_on_error: bool,

    /// Write transformed stylesheets to their destinations.
    #[serde(default = "default_true")]
    pub write_dest: bool,

    /// Run jobs one after another instead of all at once.
    #[serde(default)]
    pub sequential: bool,

    /// Diff artifact: `false`, `true` (`<dest>.diff`) or an explicit path.
    #[serde(default)]
    pub diff: DiffSetting,

    /// Source map handling: `false`, `true` (inline) or a detailed table.
    #[serde(default)]
    pub map: MapSetting,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> usize {
    20
}

impl Default for Options {
    fn default() -> Self {
        Self {
            safe: false,
            parser: None,
            stringifier: None,
            syntax: None,
            fail_on_error: false,
            write_dest: true,
            sequential: false,
            diff: DiffSetting::default(),
            map: MapSetting::default(),
        }
    }
}

/// `map` option as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapSetting {
    Enabled(bool),
    Detailed(MapDetails),
}

impl Default for MapSetting {
    fn default() -> Self {
        MapSetting::Enabled(false)
    }
}

/// Detailed `[map]` table; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDetails {
    /// Previous map lookup: a path prefix, or a flag (which disables lookup).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<Switch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,

    /// Map annotation: a flag, or a directory the sidecar map goes to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Switch>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<bool>,
}

/// A value that is either a boolean or a path string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Switch {
    Flag(bool),
    Path(String),
}

/// `diff` option as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiffSetting {
    Enabled(bool),
    Path(String),
}

impl Default for DiffSetting {
    fn default() -> Self {
        DiffSetting::Enabled(false)
    }
}

/// Logging section of a run file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written by the run logger.
    #[serde(default)]
    pub level: LogLevel,

    /// Prefix run log lines with a timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Number of recent lines kept for diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: usize,

    /// Optional file the run log is also written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            show_timestamps: true,
            error_tail: default_error_tail(),
            log_file: None,
        }
    }
}

/// Normalized source map handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOption {
    /// No source map at all.
    Off,
    /// Engine default: inline map.
    On,
    Detailed(MapConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapConfig {
    /// Prefix used to look up `<prefix><basename>.map` for each source.
    pub prev: Option<String>,
    pub inline: bool,
    pub annotation: Annotation,
    pub sources_content: bool,
}

/// Normalized map annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Passed to the engine as is.
    Flag(bool),
    /// Sidecar maps are written into this directory.
    Dir(PathBuf),
}

impl Default for Annotation {
    fn default() -> Self {
        Annotation::Flag(true)
    }
}

/// Normalized diff handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOption {
    Off,
    /// `<dest>.diff` next to each destination.
    Sidecar,
    /// Every job writes to this one path.
    Path(PathBuf),
}

/// Options forwarded opaquely to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineSettings {
    pub safe: bool,
    pub parser: Option<String>,
    pub stringifier: Option<String>,
    pub syntax: Option<String>,
}

/// Immutable per-run settings, resolved from [`Options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub map: MapOption,
    pub diff: DiffOption,
    pub engine: EngineSettings,
    pub fail_on_error: bool,
    pub write_dest: bool,
    pub sequential: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Options::default().resolve()
    }
}

impl Options {
    /// Normalize the raw option shapes.
    pub fn resolve(&self) -> Settings {
        Settings {
            map: resolve_map(&self.map),
            diff: resolve_diff(&self.diff),
            engine: EngineSettings {
                safe: self.safe,
                parser: self.parser.clone(),
                stringifier: self.stringifier.clone(),
                syntax: self.syntax.clone(),
            },
            fail_on_error: self.fail_on_error,
            write_dest: self.write_dest,
            sequential: self.sequential,
        }
    }
}

fn resolve_map(setting: &MapSetting) -> MapOption {
    match setting {
        MapSetting::Enabled(false) => MapOption::Off,
        MapSetting::Enabled(true) => MapOption::On,
        MapSetting::Detailed(details) => MapOption::Detailed(MapConfig {
            // Only a path prefix triggers a lookup; a bare flag never does.
            prev: match &details.prev {
                Some(Switch::Path(prefix)) => Some(prefix.clone()),
                _ => None,
            },
            inline: details.inline.unwrap_or(true),
            annotation: match &details.annotation {
                Some(Switch::Flag(flag)) => Annotation::Flag(*flag),
                Some(Switch::Path(dir)) => Annotation::Dir(PathBuf::from(dir)),
                None => Annotation::default(),
            },
            sources_content: details.sources_content.unwrap_or(true),
        }),
    }
}

fn resolve_diff(setting: &DiffSetting) -> DiffOption {
    match setting {
        DiffSetting::Enabled(false) => DiffOption::Off,
        DiffSetting::Enabled(true) => DiffOption::Sidecar,
        DiffSetting::Path(path) if path.is_empty() => DiffOption::Off,
        DiffSetting::Path(path) => DiffOption::Path(PathBuf::from(path)),
    }
}
