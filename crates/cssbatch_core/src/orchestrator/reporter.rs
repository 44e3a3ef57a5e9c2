//! End-of-run summary and pass/fail decision.

use super::errors::{RunError, RunResult};
use super::recorder::size_delta;
use super::tasks::BuiltJobs;
use super::types::{pluralize, RunReport, Tally};
use crate::config::Settings;
use crate::logging::RunLogger;

/// Emit the summary for a settled run.
///
/// Warnings escalate to [`RunError::IssuesFound`] when `fail_on_error` is set,
/// even though every job succeeded.
pub fn summarize(
    logger: &RunLogger,
    settings: &Settings,
    tally: Tally,
    built: BuiltJobs,
) -> RunResult<RunReport> {
    if tally.sheets > 0 {
        let sheets = pluralize(tally.sheets, "stylesheet", "stylesheets");
        if settings.write_dest {
            logger.ok(&format!(
                "{} processed {} created ({}).",
                tally.sheets,
                sheets,
                size_delta(tally.size_before, tally.size_after)
            ));
        } else {
            logger.ok(&format!(
                "{} {} processed, no files written.",
                tally.sheets, sheets
            ));
        }
    }

    if tally.maps > 0 {
        logger.ok(&format!(
            "{} {} created.",
            tally.maps,
            pluralize(tally.maps, "sourcemap", "sourcemaps")
        ));
    }

    if tally.diffs > 0 {
        logger.ok(&format!(
            "{} {} created.",
            tally.diffs,
            pluralize(tally.diffs, "diff", "diffs")
        ));
    }

    logger.json("tally", &tally);

    let report = RunReport {
        tally,
        missing_sources: built.missing_sources,
        empty_groups: built.empty_groups,
    };

    if tally.issues > 0 {
        logger.error(&format!(
            "{} {} found.",
            tally.issues,
            pluralize(tally.issues, "issue", "issues")
        ));
        if settings.fail_on_error {
            return Err(RunError::IssuesFound {
                issues: tally.issues,
                report,
            });
        }
    }

    Ok(report)
}

/// Report a job-level failure that aborted the run.
pub fn fatal(logger: &RunLogger, error: &RunError) {
    if let RunError::Syntax { path, .. } = error {
        tracing::debug!("Aborting run on syntax error in {}", path.display());
    }
    logger.fatal(&error.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use std::path::PathBuf;

    fn logger() -> RunLogger {
        RunLogger::new(
            "report",
            LogConfig {
                show_timestamps: false,
                ..LogConfig::default()
            },
            None,
        )
    }

    #[test]
    fn summarizes_written_sheets_maps_and_diffs() {
        let log = logger();
        let tally = Tally {
            sheets: 2,
            maps: 1,
            diffs: 2,
            size_before: 12_000,
            size_after: 9_000,
            ..Tally::default()
        };

        let report = summarize(&log, &Settings::default(), tally, BuiltJobs::default()).unwrap();

        assert_eq!(report.tally, tally);
        assert_eq!(
            log.get_tail(),
            vec![
                ">> 2 processed stylesheets created (12 kB → 9 kB).".to_string(),
                ">> 1 sourcemap created.".to_string(),
                ">> 2 diffs created.".to_string(),
            ]
        );
    }

    #[test]
    fn reports_no_files_written_variant() {
        let log = logger();
        let settings = Settings {
            write_dest: false,
            ..Settings::default()
        };
        let tally = Tally {
            sheets: 1,
            ..Tally::default()
        };

        summarize(&log, &settings, tally, BuiltJobs::default()).unwrap();
        assert_eq!(
            log.get_tail(),
            vec![">> 1 stylesheet processed, no files written.".to_string()]
        );
    }

    #[test]
    fn empty_tally_emits_nothing() {
        let log = logger();
        let report =
            summarize(&log, &Settings::default(), Tally::default(), BuiltJobs::default()).unwrap();
        assert_eq!(report, RunReport::default());
        assert!(log.get_tail().is_empty());
    }

    #[test]
    fn issues_fail_only_with_fail_on_error() {
        let tally = Tally {
            sheets: 1,
            issues: 3,
            ..Tally::default()
        };
        let built = BuiltJobs {
            missing_sources: vec![PathBuf::from("gone.css")],
            ..BuiltJobs::default()
        };

        let log = logger();
        let report = summarize(&log, &Settings::default(), tally, built.clone()).unwrap();
        assert_eq!(report.missing_sources, vec![PathBuf::from("gone.css")]);
        assert!(log.get_tail().contains(&"[ERROR] 3 issues found.".to_string()));

        let strict = Settings {
            fail_on_error: true,
            ..Settings::default()
        };
        let err = summarize(&logger(), &strict, tally, built).unwrap_err();
        assert!(matches!(err, RunError::IssuesFound { issues: 3, ref report } if report.tally.sheets == 1));
    }

    #[test]
    fn fatal_syntax_error_includes_excerpt() {
        let log = logger();
        let err = RunError::Syntax {
            path: PathBuf::from("a.css"),
            message: "a.css:1:2: Unclosed block".to_string(),
            excerpt: "> 1 | a{".to_string(),
        };

        fatal(&log, &err);
        assert_eq!(
            log.get_tail(),
            vec!["[FATAL] a.css:1:2: Unclosed block\n> 1 | a{".to_string()]
        );
    }
}
