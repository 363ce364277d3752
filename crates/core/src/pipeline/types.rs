//! Run results and pipeline errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::exposure::ExposureRef;
use crate::repository::RepositoryError;
use crate::stages::{
    AssociationResult, DifferenceResult, ForcedSourceCatalog, ProcessedExposure, StageError,
};

/// The four pipeline stages, in execution order.
///
/// Used for failure attribution, logging and metric labels; the order itself
/// is fixed in the runner's control flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    CcdProcessing,
    Differencing,
    Association,
    ForcedPhotometry,
}

impl StageKind {
    /// Stable name used for logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CcdProcessing => "ccd_processing",
            Self::Differencing => "differencing",
            Self::Association => "association",
            Self::ForcedPhotometry => "forced_photometry",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a populated stage field came to be.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The stage capability was invoked in this run.
    Computed,
    /// A previously persisted output was loaded instead of recomputing.
    Reused,
}

/// One stage's contribution to a run result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageOutcome<T> {
    /// The stage output, freshly computed or loaded back.
    pub output: T,
    /// Whether the output was computed or reused.
    pub provenance: Provenance,
}

impl<T> StageOutcome<T> {
    /// Wraps a freshly computed output.
    pub fn computed(output: T) -> Self {
        Self {
            output,
            provenance: Provenance::Computed,
        }
    }

    /// Wraps an output loaded from the repository.
    pub fn reused(output: T) -> Self {
        Self {
            output,
            provenance: Provenance::Reused,
        }
    }

    /// Whether this outcome was loaded rather than computed.
    pub fn is_reused(&self) -> bool {
        self.provenance == Provenance::Reused
    }
}

/// Result of one pipeline run, owned by the caller.
///
/// A stage field is populated if and only if the stage executed in this run
/// or its persisted output was loaded back under reuse mode; the
/// [`Provenance`] on each outcome tells the two apart. On the success path
/// all four fields are populated, since every stage either runs or is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Identifier of this invocation, for log correlation.
    pub run_id: String,
    /// The exposure that was processed.
    pub exposure: ExposureRef,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
    /// Instrumental-processing outcome.
    pub processed: Option<StageOutcome<ProcessedExposure>>,
    /// Differencing outcome.
    pub difference: Option<StageOutcome<DifferenceResult>>,
    /// Association outcome.
    pub association: Option<StageOutcome<AssociationResult>>,
    /// Forced-photometry outcome.
    pub forced: Option<StageOutcome<ForcedSourceCatalog>>,
}

impl RunResult {
    /// Stages whose outputs were loaded from the repository this run.
    pub fn reused_stages(&self) -> Vec<StageKind> {
        let mut reused = Vec::new();
        if self.processed.as_ref().is_some_and(StageOutcome::is_reused) {
            reused.push(StageKind::CcdProcessing);
        }
        if self.difference.as_ref().is_some_and(StageOutcome::is_reused) {
            reused.push(StageKind::Differencing);
        }
        if self.association.as_ref().is_some_and(StageOutcome::is_reused) {
            reused.push(StageKind::Association);
        }
        if self.forced.as_ref().is_some_and(StageOutcome::is_reused) {
            reused.push(StageKind::ForcedPhotometry);
        }
        reused
    }
}

/// Errors a pipeline run can fail with.
///
/// Every failure is fatal to its run: nothing is retried internally, no
/// partial result is returned, and persisted outputs of earlier stages are
/// left in place (no rollback).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The exposure reference does not resolve to an existing raw input
    /// artifact. Reported before any stage runs.
    #[error("failed to resolve raw exposure for {exposure}: {source}")]
    Resolution {
        exposure: ExposureRef,
        #[source]
        source: RepositoryError,
    },

    /// A stage failed; the stages after it never ran.
    #[error("{stage} stage failed for {exposure}: {source}")]
    Stage {
        stage: StageKind,
        exposure: ExposureRef,
        #[source]
        source: StageError,
    },

    /// The run configuration failed validation.
    #[error("invalid run configuration: {0}")]
    Configuration(#[from] ConfigError),
}

impl PipelineError {
    /// Creates a stage-attributed failure.
    pub fn stage(stage: StageKind, exposure: ExposureRef, source: StageError) -> Self {
        Self::Stage {
            stage,
            exposure,
            source,
        }
    }

    /// The stage the failure is attributed to, if any.
    pub fn stage_kind(&self) -> Option<StageKind> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            Self::Resolution { .. } | Self::Configuration(_) => None,
        }
    }

    /// Whether re-invoking the run could plausibly succeed.
    ///
    /// Advisory for callers; the pipeline itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Resolution { source, .. } => source.is_retryable(),
            Self::Stage { source, .. } => source.is_retryable(),
            Self::Configuration(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_names() {
        assert_eq!(StageKind::CcdProcessing.to_string(), "ccd_processing");
        assert_eq!(StageKind::ForcedPhotometry.as_str(), "forced_photometry");
    }

    #[test]
    fn test_stage_outcome_provenance() {
        let computed = StageOutcome::computed(1u32);
        let reused = StageOutcome::reused(2u32);

        assert!(!computed.is_reused());
        assert!(reused.is_reused());
        assert_eq!(computed.provenance, Provenance::Computed);
        assert_eq!(reused.provenance, Provenance::Reused);
    }

    #[test]
    fn test_pipeline_error_attribution() {
        let exposure = ExposureRef::new(413635, 42);
        let err = PipelineError::stage(
            StageKind::Differencing,
            exposure,
            StageError::failed("psf matching diverged"),
        );

        assert_eq!(err.stage_kind(), Some(StageKind::Differencing));
        assert!(!err.is_retryable());
        let message = err.to_string();
        assert!(message.contains("differencing"));
        assert!(message.contains("visit=413635"));
    }

    #[test]
    fn test_configuration_error_has_no_stage() {
        let err = PipelineError::Configuration(ConfigError::ValidationError(
            "apdb.url must use the sqlite:// scheme".to_string(),
        ));
        assert_eq!(err.stage_kind(), None);
        assert!(!err.is_retryable());
    }
}
