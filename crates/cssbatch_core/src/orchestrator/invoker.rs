//! Invocation of the engine for a single job.

use std::path::Path;

use super::types::{Job, RunContext};
use crate::artifacts::{resolve_annotation, resolve_prev_map};
use crate::config::{MapOption, Settings};
use crate::engine::{Engine, EngineError, MapDirectives, MapRequest, TransformOptions, TransformResult};

/// Build the engine options for one source/destination pair.
pub async fn transform_options(settings: &Settings, source: &Path, dest: &Path) -> TransformOptions {
    let map = match &settings.map {
        MapOption::Off => MapRequest::Flag(false),
        MapOption::On => MapRequest::Flag(true),
        MapOption::Detailed(config) => MapRequest::Detailed(MapDirectives {
            prev: resolve_prev_map(source, config.prev.as_deref()).await,
            inline: config.inline,
            annotation: resolve_annotation(dest, &config.annotation),
            sources_content: config.sources_content,
        }),
    };

    TransformOptions {
        map,
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        safe: settings.engine.safe,
        parser: settings.engine.parser.clone(),
        stringifier: settings.engine.stringifier.clone(),
        syntax: settings.engine.syntax.clone(),
    }
}

/// Run the processor chain over `job`'s input.
pub async fn invoke<E: Engine>(ctx: &RunContext<E>, job: &Job) -> Result<TransformResult, EngineError> {
    let options = transform_options(&ctx.settings, &job.source, &job.dest).await;
    tracing::trace!("Transforming {} -> {}", job.source.display(), job.dest.display());
    ctx.engine.transform(&ctx.steps, &job.input, &options).await
}
