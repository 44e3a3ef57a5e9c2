//! Core types for the orchestrator.

use std::iter::Sum;
use std::ops::AddAssign;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::engine::Engine;
use crate::logging::RunLogger;

/// A declared source → destination association.
///
/// Sources are concrete paths; pattern expansion belongs to the host.
/// Without a destination every source is transformed in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapping {
    pub src: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,
}

impl FileMapping {
    /// Map `src` to a single destination.
    pub fn new<I, P>(src: I, dest: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            src: src.into_iter().map(Into::into).collect(),
            dest: Some(dest.into()),
        }
    }

    /// Transform every source in place.
    pub fn in_place<I, P>(src: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            src: src.into_iter().map(Into::into).collect(),
            dest: None,
        }
    }
}

/// One file's transformation unit.
///
/// The input is read once when the job is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: String,
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl Job {
    pub fn new(input: impl Into<String>, source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            source: source.into(),
            dest: dest.into(),
        }
    }
}

/// Run counters.
///
/// Every job produces its own tally; the scheduler sums them once all jobs
/// have settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub sheets: usize,
    pub maps: usize,
    pub diffs: usize,
    pub issues: usize,
    /// Bytes of input read.
    pub size_before: u64,
    /// Bytes of output written.
    pub size_after: u64,
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.sheets += other.sheets;
        self.maps += other.maps;
        self.diffs += other.diffs;
        self.issues += other.issues;
        self.size_before += other.size_before;
        self.size_after += other.size_after;
    }
}

impl Sum for Tally {
    fn sum<I: Iterator<Item = Tally>>(iter: I) -> Self {
        iter.fold(Tally::default(), |mut acc, tally| {
            acc += tally;
            acc
        })
    }
}

/// Everything one run needs, passed explicitly to every component.
pub struct RunContext<E: Engine> {
    /// Settings resolved for this run.
    pub settings: Settings,
    pub engine: Arc<E>,
    /// Processor chain resolved for this run.
    pub steps: Vec<E::Step>,
    pub logger: Arc<RunLogger>,
}

impl<E: Engine> RunContext<E> {
    pub fn new(
        settings: Settings,
        engine: Arc<E>,
        steps: Vec<E::Step>,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            settings,
            engine,
            steps,
            logger,
        }
    }
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub tally: Tally,
    /// Declared sources that did not exist, in declaration order.
    pub missing_sources: Vec<PathBuf>,
    /// Mappings left with no sources after filtering.
    pub empty_groups: usize,
}

/// `singular` for exactly one, `plural` otherwise.
pub(crate) fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_sum() {
        let one = Tally {
            sheets: 1,
            issues: 2,
            size_before: 10,
            size_after: 8,
            ..Tally::default()
        };
        let two = Tally {
            sheets: 1,
            maps: 1,
            diffs: 1,
            size_before: 5,
            ..Tally::default()
        };

        let total: Tally = vec![one, two].into_iter().sum();
        assert_eq!(total.sheets, 2);
        assert_eq!(total.maps, 1);
        assert_eq!(total.diffs, 1);
        assert_eq!(total.issues, 2);
        assert_eq!(total.size_before, 15);
        assert_eq!(total.size_after, 8);
    }

    #[test]
    fn pluralize_handles_zero_one_many() {
        assert_eq!(pluralize(0, "diff", "diffs"), "diffs");
        assert_eq!(pluralize(1, "diff", "diffs"), "diff");
        assert_eq!(pluralize(7, "diff", "diffs"), "diffs");
    }

    #[test]
    fn mapping_constructors() {
        let mapping = FileMapping::new(["a.css", "b.css"], "out.css");
        assert_eq!(mapping.src.len(), 2);
        assert_eq!(mapping.dest, Some(PathBuf::from("out.css")));
        assert_eq!(FileMapping::in_place(["a.css"]).dest, None);
    }

    #[test]
    fn report_serializes() {
        let report = RunReport {
            tally: Tally {
                sheets: 3,
                ..Tally::default()
            },
            missing_sources: vec![PathBuf::from("gone.css")],
            empty_groups: 0,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"sheets\":3"));
        assert!(json.contains("gone.css"));
    }
}
