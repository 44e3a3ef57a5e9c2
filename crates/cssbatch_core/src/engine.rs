//! Contract with the transformation engine.
//!
//! The engine is an external collaborator: it receives the processor chain,
//! the source text and [`TransformOptions`], and returns the rewritten text
//! with an optional serialized source map and any non-fatal warnings. Engines
//! fail with [`EngineError::Syntax`] when they cannot parse the input and with
//! [`EngineError::Failed`] for everything else.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

/// A pluggable stylesheet transformation engine.
///
/// `Step` is whatever the engine uses as one processor in its chain; the
/// orchestrator never looks inside it.
pub trait Engine: Send + Sync {
    type Step: Send + Sync;

    /// Run `steps` over `input`.
    fn transform<'a>(
        &'a self,
        steps: &'a [Self::Step],
        input: &'a str,
        options: &'a TransformOptions,
    ) -> BoxFuture<'a, Result<TransformResult, EngineError>>;
}

/// The processor chain, either fixed or produced on demand.
pub enum Processors<S> {
    List(Vec<S>),
    Factory(Arc<dyn Fn() -> Vec<S> + Send + Sync>),
}

impl<S: Clone> Processors<S> {
    /// Produce the chain for one run.
    pub fn resolve(&self) -> Vec<S> {
        match self {
            Processors::List(steps) => steps.clone(),
            Processors::Factory(factory) => factory(),
        }
    }
}

impl<S> Default for Processors<S> {
    fn default() -> Self {
        Processors::List(Vec::new())
    }
}

impl<S> fmt::Debug for Processors<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Processors::List(steps) => write!(f, "Processors::List({} steps)", steps.len()),
            Processors::Factory(_) => f.write_str("Processors::Factory"),
        }
    }
}

/// Options handed to the engine for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub map: MapRequest,
    /// Source path.
    pub from: PathBuf,
    /// Destination path.
    pub to: PathBuf,
    pub safe: bool,
    pub parser: Option<String>,
    pub stringifier: Option<String>,
    pub syntax: Option<String>,
}

/// Source map request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapRequest {
    /// `true` asks for the engine's default inline map, `false` for none.
    Flag(bool),
    Detailed(MapDirectives),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDirectives {
    /// Contents of a previous map for this source, if one was found.
    pub prev: Option<String>,
    pub inline: bool,
    pub annotation: AnnotationRef,
    pub sources_content: bool,
}

/// How the output should reference its source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationRef {
    /// Use (or suppress) the engine's default annotation.
    Flag(bool),
    /// Relative path from the output's directory to its map, `/`-separated.
    Path(String),
}

/// Successful engine output for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformResult {
    pub css: String,
    /// Serialized external source map; `None` when disabled or inlined.
    pub map: Option<String>,
    pub warnings: Vec<Warning>,
}

/// A non-fatal issue reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub plugin: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            plugin: None,
            file: None,
            line: None,
            column: None,
        }
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(plugin) = &self.plugin {
            write!(f, "{}: ", plugin)?;
        }
        if let Some(file) = &self.file {
            write!(f, "{}", file)?;
            if let (Some(line), Some(column)) = (self.line, self.column) {
                write!(f, ":{}:{}", line, column)?;
            }
            write!(f, ": ")?;
        }
        f.write_str(&self.message)
    }
}

/// Input the engine could not parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    /// Source lines around the failure, already formatted for display.
    pub excerpt: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            excerpt: excerpt.into(),
        }
    }
}

/// Error returned by an engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl EngineError {
    /// Create a generic engine failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error.
    pub fn from_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
