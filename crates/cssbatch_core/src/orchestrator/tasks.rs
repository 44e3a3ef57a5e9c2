//! Expansion of declared mappings into jobs.
//!
//! Existence filtering happens before any job is built: a missing source is
//! warned about and dropped, and a mapping left without sources is reported
//! as an error and skipped. Neither stops the run.

use std::path::PathBuf;

use super::errors::RunResult;
use super::fs;
use super::types::{FileMapping, Job};
use crate::logging::RunLogger;

/// Jobs built from a set of mappings, plus what was filtered out.
#[derive(Debug, Clone, Default)]
pub struct BuiltJobs {
    /// Jobs in discovery order.
    pub jobs: Vec<Job>,
    pub missing_sources: Vec<PathBuf>,
    pub empty_groups: usize,
}

/// Build jobs for `mappings`, preserving mapping order and source order.
///
/// Each surviving source is read here, once.
pub async fn build_jobs(mappings: &[FileMapping], logger: &RunLogger) -> RunResult<BuiltJobs> {
    let mut built = BuiltJobs::default();

    for mapping in mappings {
        let mut sources = Vec::with_capacity(mapping.src.len());
        for path in &mapping.src {
            if fs::exists(path).await {
                sources.push(path);
            } else {
                logger.warn(&format!("Source file {} not found.", path.display()));
                built.missing_sources.push(path.clone());
            }
        }

        if sources.is_empty() {
            match &mapping.dest {
                Some(dest) => logger.error(&format!(
                    "No source files were found for {}.",
                    dest.display()
                )),
                None => logger.error("No source files were found."),
            }
            built.empty_groups += 1;
            continue;
        }

        for source in sources {
            let input = fs::read(source).await?;
            let dest = mapping.dest.clone().unwrap_or_else(|| source.clone());
            built.jobs.push(Job::new(input, source.clone(), dest));
        }
    }

    tracing::debug!(
        "Built {} jobs from {} mappings ({} missing sources)",
        built.jobs.len(),
        mappings.len(),
        built.missing_sources.len()
    );

    Ok(built)
}
