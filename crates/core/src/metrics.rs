//! Prometheus metrics for the pipeline.
//!
//! This module provides metrics for:
//! - Runs (started, finished by result, duration)
//! - Stages (executions, reuses, failures, duration)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Run Metrics
// =============================================================================

/// Runs started total.
pub static RUNS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("diapipe_runs_started_total", "Total pipeline runs started").unwrap()
});

/// Runs finished total by result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("diapipe_runs_total", "Total pipeline runs finished"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Whole-run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "diapipe_run_duration_seconds",
            "Duration of whole pipeline runs",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Stage Metrics
// =============================================================================

/// Stage executions total by stage.
pub static STAGE_EXECUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "diapipe_stage_executions_total",
            "Total stage capability invocations",
        ),
        &["stage"],
    )
    .unwrap()
});

/// Stage reuses total by stage (persisted output loaded instead of computed).
pub static STAGE_REUSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "diapipe_stage_reuses_total",
            "Total stage outputs reused from the repository",
        ),
        &["stage"],
    )
    .unwrap()
});

/// Stage failures total by stage.
pub static STAGE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("diapipe_stage_failures_total", "Total stage failures"),
        &["stage"],
    )
    .unwrap()
});

/// Stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "diapipe_stage_duration_seconds",
            "Duration of stage executions",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0]),
        &["stage"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Runs
        Box::new(RUNS_STARTED.clone()),
        Box::new(RUNS_TOTAL.clone()),
        Box::new(RUN_DURATION.clone()),
        // Stages
        Box::new(STAGE_EXECUTIONS.clone()),
        Box::new(STAGE_REUSES.clone()),
        Box::new(STAGE_FAILURES.clone()),
        Box::new(STAGE_DURATION.clone()),
    ]
}
