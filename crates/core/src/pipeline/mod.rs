//! The pipeline orchestrator.
//!
//! [`DiaPipeline`] drives the four stages in fixed order over one exposure:
//! instrumental processing, image differencing, source association, forced
//! photometry. The first two stages can be skipped under reuse mode when
//! their persisted outputs already exist; the last two always execute once
//! reached. Any failure aborts the whole run.

mod runner;
mod types;

pub use runner::DiaPipeline;
pub use types::{PipelineError, Provenance, RunResult, StageKind, StageOutcome};
