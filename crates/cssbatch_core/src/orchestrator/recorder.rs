//! Recording of a finished job: warnings, output, map and diff.

use std::path::Path;

use similar::{Algorithm, TextDiff};

use super::errors::RunResult;
use super::fs;
use super::types::{Job, RunContext, Tally};
use crate::artifacts::{diff_destination, map_destination};
use crate::config::MapOption;
use crate::engine::{Engine, TransformResult};

/// Write the artifacts for `job` and return its share of the run tally.
///
/// Order: warnings, destination, sheet count, source map, diff.
pub async fn record<E: Engine>(
    ctx: &RunContext<E>,
    job: &Job,
    result: TransformResult,
) -> RunResult<Tally> {
    let settings = &ctx.settings;
    let logger = &ctx.logger;
    let mut tally = Tally {
        size_before: job.input.len() as u64,
        ..Tally::default()
    };

    tally.issues += result.warnings.len();
    for warning in &result.warnings {
        logger.error(&warning.to_string());
    }

    if settings.write_dest {
        tally.size_after += result.css.len() as u64;
        fs::write(&job.dest, &result.css).await?;
        logger.debug(&format!(
            "File {} created ({}).",
            job.dest.display(),
            size_delta(job.input.len() as u64, result.css.len() as u64)
        ));
    }

    tally.sheets += 1;

    if let Some(map) = &result.map {
        if settings.map == MapOption::Off {
            tracing::debug!("Dropping map for {}: maps are disabled", job.dest.display());
        } else {
            let map_path = map_destination(&job.dest, &settings.map);
            fs::write(&map_path, map).await?;
            logger.debug(&format!("File {} created (source map).", map_path.display()));
            tally.maps += 1;
        }
    }

    if let Some(diff_path) = diff_destination(&job.dest, &settings.diff) {
        let patch = unified_diff(&job.dest, &job.input, &result.css);
        fs::write(&diff_path, &patch).await?;
        logger.debug(&format!("File {} created (diff).", diff_path.display()));
        tally.diffs += 1;
    }

    Ok(tally)
}

/// Unified diff between `original` and `transformed`, labelled with `dest`.
pub fn unified_diff(dest: &Path, original: &str, transformed: &str) -> String {
    let label = dest.to_string_lossy();
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(original, transformed);

    let mut patch = format!("Index: {}\n{}\n", label, "=".repeat(67));
    patch.push_str(
        &diff
            .unified_diff()
            .context_radius(4)
            .header(&label, &label)
            .to_string(),
    );
    patch
}

/// Human-readable byte count in decimal units, three significant digits.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

    if bytes < 1000 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    // 999.5 and up rounds to 1000, which belongs to the next unit
    while value >= 999.5 && unit + 1 < UNITS.len() {
        value /= 1000.0;
        unit += 1;
    }

    let decimals: usize = if value >= 99.95 {
        0
    } else if value >= 9.995 {
        1
    } else {
        2
    };
    let number = format!("{:.*}", decimals, value);
    let number = if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        number
    };
    format!("{} {}", number, UNITS[unit])
}

/// `before → after`, both formatted with [`format_size`].
pub fn size_delta(before: u64, after: u64) -> String {
    format!("{} → {}", format_size(before), format_size(after))
}
