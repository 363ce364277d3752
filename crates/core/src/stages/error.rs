//! Error type shared by the stage capabilities.

use thiserror::Error;

use crate::apdb::ApdbError;
use crate::repository::RepositoryError;

/// Errors a pipeline stage can fail with.
///
/// Stage implementations are opaque to the orchestrator, so this enum only
/// distinguishes the failure classes the orchestrator and its callers care
/// about; anything else travels through [`StageError::Other`].
#[derive(Debug, Error)]
pub enum StageError {
    /// An input the stage needs besides the pipeline-provided ones is
    /// missing, such as the reference template for differencing.
    #[error("missing precondition: {what}")]
    MissingPrecondition { what: String },

    /// Loading or persisting an artifact failed during the stage step.
    #[error("artifact access failed: {0}")]
    Repository(#[from] RepositoryError),

    /// The association database could not be reached or used.
    #[error("association database error: {0}")]
    Database(#[from] ApdbError),

    /// The stage's own computation failed.
    #[error("stage computation failed: {reason}")]
    Failed { reason: String },

    /// Any other stage-internal failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    /// Creates a computation-failed error.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Creates a missing-precondition error.
    pub fn missing_precondition(what: impl Into<String>) -> Self {
        Self::MissingPrecondition { what: what.into() }
    }

    /// Whether retrying the run could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Repository(e) => e.is_retryable(),
            Self::Database(e) => e.is_retryable(),
            Self::MissingPrecondition { .. } | Self::Failed { .. } | Self::Other(_) => false,
        }
    }
}
