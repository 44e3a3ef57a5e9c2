//! Error types for a run.
//!
//! Only fatal conditions are errors. Missing sources and empty mapping
//! groups are reported through the logger and the [`RunReport`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::{pluralize, RunReport};
use crate::engine::EngineError;

/// A run-ending failure.
#[derive(Error, Debug)]
pub enum RunError {
    /// The engine could not parse a source.
    #[error("{}", join_excerpt(message, excerpt))]
    Syntax {
        path: PathBuf,
        message: String,
        excerpt: String,
    },

    /// Any other engine failure, forwarded as is.
    #[error("Failed to process '{}': {source}", path.display())]
    Engine {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    /// Reading a source or writing an artifact failed.
    #[error("I/O error while {operation} '{}': {source}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Warnings were reported and `fail_on_error` is set.
    #[error("{issues} {} found", pluralize(*issues, "issue", "issues"))]
    IssuesFound { issues: usize, report: RunReport },
}

impl RunError {
    /// Classify an engine failure for `path`.
    pub fn from_engine(path: &Path, error: EngineError) -> Self {
        match error {
            EngineError::Syntax(syntax) => Self::Syntax {
                path: path.to_path_buf(),
                message: syntax.message,
                excerpt: syntax.excerpt,
            },
            other => Self::Engine {
                path: path.to_path_buf(),
                source: other,
            },
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, path: &Path, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this failure came from a single job rather than the run as a whole.
    pub fn is_job_failure(&self) -> bool {
        !matches!(self, Self::IssuesFound { .. })
    }
}

fn join_excerpt(message: &str, excerpt: &str) -> String {
    if excerpt.is_empty() {
        message.to_string()
    } else {
        format!("{}\n{}", message, excerpt)
    }
}

/// Result type for run operations.
pub type RunResult<T> = Result<T, RunError>;
