//! Error types for the repository module.

use thiserror::Error;

use super::types::DatasetRef;

/// Errors that can occur while resolving or persisting artifacts.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No artifact exists for the requested dataset.
    #[error("dataset not found: {0}")]
    NotFound(DatasetRef),

    /// Reading a stored artifact failed.
    #[error("failed to read dataset {dataset}: {source}")]
    Read {
        dataset: DatasetRef,
        #[source]
        source: std::io::Error,
    },

    /// Writing an artifact failed.
    #[error("failed to write dataset {dataset}: {source}")]
    Write {
        dataset: DatasetRef,
        #[source]
        source: std::io::Error,
    },

    /// A stored artifact could not be decoded into its payload type.
    #[error("failed to decode dataset {dataset}: {reason}")]
    Decode { dataset: DatasetRef, reason: String },

    /// A payload could not be encoded into an artifact.
    #[error("failed to encode dataset {dataset}: {reason}")]
    Encode { dataset: DatasetRef, reason: String },
}

impl RepositoryError {
    /// Creates a read error for the given dataset.
    pub fn read(dataset: DatasetRef, source: std::io::Error) -> Self {
        Self::Read { dataset, source }
    }

    /// Creates a write error for the given dataset.
    pub fn write(dataset: DatasetRef, source: std::io::Error) -> Self {
        Self::Write { dataset, source }
    }

    /// Whether retrying the operation could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Write { .. })
    }
}
