//! Job scheduling: a strict queue or one concurrent batch.
//!
//! In sequential mode a job is invoked only after the previous job's
//! artifacts have been written. In concurrent mode every job is in flight at
//! once on the current task and the first failure ends the wait; writes
//! already performed by other jobs are kept.

use std::collections::VecDeque;

use futures_util::future::try_join_all;

use super::errors::{RunError, RunResult};
use super::invoker::invoke;
use super::recorder::record;
use super::types::{Job, RunContext, Tally};
use crate::engine::Engine;

/// Run every job and return the merged tally.
pub async fn run_jobs<E: Engine>(ctx: &RunContext<E>, jobs: Vec<Job>) -> RunResult<Tally> {
    if ctx.settings.sequential {
        run_sequential(ctx, jobs).await
    } else {
        run_concurrent(ctx, jobs).await
    }
}

/// Invoke the engine for `job`, then record its result.
async fn process<E: Engine>(ctx: &RunContext<E>, job: Job) -> RunResult<Tally> {
    let result = invoke(ctx, &job)
        .await
        .map_err(|e| RunError::from_engine(&job.source, e))?;
    record(ctx, &job, result).await
}

async fn run_sequential<E: Engine>(ctx: &RunContext<E>, jobs: Vec<Job>) -> RunResult<Tally> {
    let mut queue: VecDeque<Job> = jobs.into();
    let mut tally = Tally::default();

    while let Some(job) = queue.pop_front() {
        tally += process(ctx, job).await?;
    }

    Ok(tally)
}

async fn run_concurrent<E: Engine>(ctx: &RunContext<E>, jobs: Vec<Job>) -> RunResult<Tally> {
    let in_flight: Vec<_> = jobs.into_iter().map(|job| process(ctx, job)).collect();
    let tallies = try_join_all(in_flight).await?;
    Ok(tallies.into_iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::engine::{EngineError, TransformResult};
    use crate::test_support::{context, ScriptedEngine};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn jobs_in(dir: &std::path::Path, count: usize) -> Vec<Job> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("{}.css", i));
                Job::new(format!("a{{order:{}}}", i), &path, &path)
            })
            .collect()
    }

    fn sequential() -> Settings {
        Settings {
            sequential: true,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn empty_queue_completes_immediately() {
        let ctx = context(ScriptedEngine::identity(), sequential(), Vec::new());
        let tally = run_jobs(&ctx, Vec::new()).await.unwrap();
        assert_eq!(tally, Tally::default());
        assert!(ctx.engine.calls().is_empty());
    }

    #[tokio::test]
    async fn sequential_commits_writes_before_next_invocation() {
        let dir = tempdir().unwrap();
        let seen: Arc<parking_lot::Mutex<Vec<PathBuf>>> = Arc::default();
        let seen_by_engine = Arc::clone(&seen);

        let engine = ScriptedEngine::new(move |_steps, input, options| {
            let mut seen = seen_by_engine.lock();
            for earlier in seen.iter() {
                if !earlier.exists() {
                    return Err(EngineError::failed(format!(
                        "{} was not written yet",
                        earlier.display()
                    )));
                }
            }
            seen.push(options.to.clone());
            Ok(TransformResult {
                css: input.to_string(),
                ..Default::default()
            })
        });
        let ctx = context(engine, sequential(), Vec::new());

        let tally = run_jobs(&ctx, jobs_in(dir.path(), 4)).await.unwrap();

        assert_eq!(tally.sheets, 4);
        assert_eq!(ctx.engine.peak_in_flight(), 1);
        let order: Vec<PathBuf> = (0..4).map(|i| dir.path().join(format!("{}.css", i))).collect();
        assert_eq!(ctx.engine.calls(), order);
    }

    #[tokio::test]
    async fn concurrent_jobs_are_in_flight_together() {
        let dir = tempdir().unwrap();
        let ctx = context(ScriptedEngine::identity(), Settings::default(), Vec::new());

        let tally = run_jobs(&ctx, jobs_in(dir.path(), 3)).await.unwrap();

        assert_eq!(tally.sheets, 3);
        assert_eq!(ctx.engine.peak_in_flight(), 3);
        for i in 0..3 {
            assert!(dir.path().join(format!("{}.css", i)).exists());
        }
    }

    #[tokio::test]
    async fn sequential_failure_stops_the_queue() {
        let dir = tempdir().unwrap();
        let engine = ScriptedEngine::new(|_steps, input, options| {
            if options.from.ends_with("1.css") {
                return Err(EngineError::failed("boom"));
            }
            Ok(TransformResult {
                css: input.to_string(),
                ..Default::default()
            })
        });
        let ctx = context(engine, sequential(), Vec::new());

        let err = run_jobs(&ctx, jobs_in(dir.path(), 3)).await.unwrap_err();

        assert!(matches!(err, RunError::Engine { .. }));
        assert_eq!(ctx.engine.calls().len(), 2);
        assert!(dir.path().join("0.css").exists());
        assert!(!dir.path().join("2.css").exists());
    }

    #[tokio::test]
    async fn concurrent_failure_rejects_the_batch_and_keeps_finished_writes() {
        let dir = tempdir().unwrap();
        let finished = vec![dir.path().join("1.css"), dir.path().join("2.css")];
        let engine = ScriptedEngine::new(|_steps, input, options| {
            if options.from.ends_with("0.css") {
                return Err(EngineError::failed("boom"));
            }
            Ok(TransformResult {
                css: input.to_string(),
                ..Default::default()
            })
        })
        .hold("0.css", finished.clone());
        let ctx = context(engine, Settings::default(), Vec::new());

        let err = run_jobs(&ctx, jobs_in(dir.path(), 3)).await.unwrap_err();

        assert!(matches!(err, RunError::Engine { ref path, .. } if path.ends_with("0.css")));
        assert!(!dir.path().join("0.css").exists());
        for path in &finished {
            assert!(path.exists(), "{} was rolled back", path.display());
        }
    }
}
