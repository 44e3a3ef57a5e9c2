//! Run orchestrator: mappings in, artifacts and a report out.
//!
//! A run turns declared file mappings into jobs, hands each job to the
//! engine, records what the engine returned and summarizes the result.
//!
//! # Architecture
//!
//! ```text
//! Runner::run
//!     ├── tasks      mappings -> jobs (missing sources filtered out)
//!     ├── scheduler  sequential queue | concurrent batch
//!     │     ├── invoker   job -> engine options -> TransformResult
//!     │     └── recorder  warnings, dest, map, diff -> per-job Tally
//!     └── reporter   summary lines, fail_on_error
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cssbatch_core::config::Options;
//! use cssbatch_core::engine::Processors;
//! use cssbatch_core::orchestrator::{FileMapping, Runner};
//!
//! let runner = Runner::new(my_engine, Processors::List(steps), &Options::default());
//! let report = runner
//!     .run(&[FileMapping::new(["src/a.css"], "dist/a.css")])
//!     .await?;
//! println!("{} stylesheets", report.tally.sheets);
//! ```

mod errors;
mod fs;
mod invoker;
mod recorder;
mod reporter;
mod runner;
mod scheduler;
mod tasks;
mod types;

pub use errors::{RunError, RunResult};
pub use invoker::transform_options;
pub use recorder::{format_size, size_delta, unified_diff};
pub use runner::Runner;
pub use tasks::{build_jobs, BuiltJobs};
pub use types::{FileMapping, Job, RunContext, RunReport, Tally};
