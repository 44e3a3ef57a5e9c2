//! Scripted engine and context helpers shared by unit tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;

use crate::config::Settings;
use crate::engine::{Engine, EngineError, TransformOptions, TransformResult};
use crate::logging::{LogConfig, RunLogger};
use crate::orchestrator::RunContext;

type Script = dyn Fn(&[&'static str], &str, &TransformOptions) -> Result<TransformResult, EngineError>
    + Send
    + Sync;

/// Engine whose behavior is a closure; records every call it receives.
pub struct ScriptedEngine {
    script: Box<Script>,
    calls: Mutex<Vec<PathBuf>>,
    active: Mutex<usize>,
    peak: Mutex<usize>,
    hold: Option<(&'static str, Vec<PathBuf>)>,
}

impl ScriptedEngine {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&[&'static str], &str, &TransformOptions) -> Result<TransformResult, EngineError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
            active: Mutex::new(0),
            peak: Mutex::new(0),
            hold: None,
        }
    }

    /// Delay the script for sources named `file_name` until every path in
    /// `until` exists (bounded at about two seconds).
    pub fn hold(mut self, file_name: &'static str, until: Vec<PathBuf>) -> Self {
        self.hold = Some((file_name, until));
        self
    }

    /// Returns the input unchanged.
    pub fn identity() -> Self {
        Self::new(|_steps, input, _options| {
            Ok(TransformResult {
                css: input.to_string(),
                ..Default::default()
            })
        })
    }

    /// `from` of every invocation, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }

    /// Highest number of invocations that were in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        *self.peak.lock()
    }
}

impl Engine for ScriptedEngine {
    type Step = &'static str;

    fn transform<'a>(
        &'a self,
        steps: &'a [Self::Step],
        input: &'a str,
        options: &'a TransformOptions,
    ) -> BoxFuture<'a, Result<TransformResult, EngineError>> {
        Box::pin(async move {
            self.calls.lock().push(options.from.clone());
            {
                let mut active = self.active.lock();
                *active += 1;
                let mut peak = self.peak.lock();
                *peak = (*peak).max(*active);
            }

            // Let sibling jobs start before this one settles
            tokio::task::yield_now().await;

            if let Some((file_name, until)) = &self.hold {
                if options.from.ends_with(*file_name) {
                    for _ in 0..400 {
                        if until.iter().all(|path| path.exists()) {
                            break;
                        }
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    }
                }
            }

            let result = (self.script)(steps, input, options);
            *self.active.lock() -= 1;
            result
        })
    }
}

/// Context with a quiet, timestamp-free logger.
pub fn context(
    engine: ScriptedEngine,
    settings: Settings,
    steps: Vec<&'static str>,
) -> RunContext<ScriptedEngine> {
    let logger = RunLogger::new(
        "test",
        LogConfig {
            show_timestamps: false,
            ..LogConfig::default()
        },
        None,
    );
    RunContext::new(settings, Arc::new(engine), steps, Arc::new(logger))
}
