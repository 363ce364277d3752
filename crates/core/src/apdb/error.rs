//! Error types for the APDB module.

use thiserror::Error;

use crate::config::IsolationLevel;

/// Errors that can occur while connecting to or using the association
/// database.
#[derive(Debug, Error)]
pub enum ApdbError {
    /// The connection URL uses a scheme this backend does not handle.
    #[error("unsupported apdb url scheme: {url}")]
    UnsupportedScheme { url: String },

    /// The database could not be opened, e.g. the file does not exist.
    #[error("failed to open apdb {url}: {reason}")]
    Connection { url: String, reason: String },

    /// The configured isolation level cannot be provided by this backend.
    #[error("isolation level {level} is not supported by the sqlite backend")]
    UnsupportedIsolation { level: IsolationLevel },

    /// A query on an open connection failed.
    #[error("apdb query failed: {reason}")]
    Query { reason: String },
}

impl ApdbError {
    /// Creates a connection error for the given URL.
    pub fn connection(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a query error.
    pub fn query(reason: impl Into<String>) -> Self {
        Self::Query {
            reason: reason.into(),
        }
    }

    /// Whether retrying the run could plausibly succeed.
    ///
    /// Connection and configuration problems need operator intervention;
    /// query failures may be transient (e.g. a locked database).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Query { .. })
    }
}
