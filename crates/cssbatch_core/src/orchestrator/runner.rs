//! Single entry point a host task-runner calls.

use std::path::Path;
use std::sync::Arc;

use super::errors::{RunError, RunResult};
use super::reporter::{fatal, summarize};
use super::scheduler::run_jobs;
use super::tasks::build_jobs;
use super::types::{FileMapping, RunContext, RunReport};
use crate::config::{Options, RunConfig, Settings};
use crate::engine::{Engine, Processors};
use crate::logging::{LogCallback, LogConfig, RunLogger};

/// Runs declared mappings through an engine.
///
/// Settings are resolved once at construction. The processor chain is
/// resolved again at the start of every [`Runner::run`], so a factory sees
/// one call per run.
pub struct Runner<E: Engine> {
    engine: Arc<E>,
    processors: Processors<E::Step>,
    settings: Settings,
    logger: Arc<RunLogger>,
}

impl<E: Engine> Runner<E>
where
    E::Step: Clone,
{
    /// Create a runner that logs through a default, callback-less logger.
    pub fn new(engine: E, processors: Processors<E::Step>, options: &Options) -> Self {
        Self {
            engine: Arc::new(engine),
            processors,
            settings: options.resolve(),
            logger: Arc::new(RunLogger::new("cssbatch", LogConfig::default(), None)),
        }
    }

    /// Replace the run logger.
    pub fn with_logger(mut self, logger: Arc<RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Create a runner from a loaded run file.
    ///
    /// The `[logging]` section configures the run logger, including its
    /// optional log file.
    pub fn from_config(
        engine: E,
        processors: Processors<E::Step>,
        config: &RunConfig,
        callback: Option<LogCallback>,
    ) -> RunResult<Self> {
        let log_config = LogConfig::from(&config.logging);
        let logger = match &config.logging.log_file {
            Some(path) => RunLogger::with_log_file("cssbatch", path, log_config, callback)
                .map_err(|e| RunError::io("creating log file", Path::new(path), e))?,
            None => RunLogger::new("cssbatch", log_config, callback),
        };

        Ok(Self::new(engine, processors, &config.options).with_logger(Arc::new(logger)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn logger(&self) -> &Arc<RunLogger> {
        &self.logger
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Process every mapping and report the outcome.
    ///
    /// Missing sources and empty mappings are reported but never fail the
    /// run. The first job failure does, as do warnings when
    /// `fail_on_error` is set.
    pub async fn run(&self, mappings: &[FileMapping]) -> RunResult<RunReport> {
        let ctx = RunContext::new(
            self.settings.clone(),
            Arc::clone(&self.engine),
            self.processors.resolve(),
            Arc::clone(&self.logger),
        );
        tracing::debug!(
            "Starting run: {} mappings, {} steps, sequential={}",
            mappings.len(),
            ctx.steps.len(),
            ctx.settings.sequential
        );

        let outcome = execute(&ctx, mappings).await;
        if let Err(error) = &outcome {
            if error.is_job_failure() {
                fatal(&ctx.logger, error);
            }
        }

        ctx.logger.flush();
        outcome
    }
}

async fn execute<E: Engine>(ctx: &RunContext<E>, mappings: &[FileMapping]) -> RunResult<RunReport> {
    let mut built = build_jobs(mappings, &ctx.logger).await?;
    let jobs = std::mem::take(&mut built.jobs);
    let tally = run_jobs(ctx, jobs).await?;
    summarize(&ctx.logger, &ctx.settings, tally, built)
}
