//! Trait definition for the data-access layer.

use async_trait::async_trait;

use super::error::RepositoryError;
use super::types::{Artifact, DatasetRef};

/// Resolves logical dataset references to stored artifacts and persists new
/// ones.
///
/// This is the pipeline's only view of durable artifact storage. `exists` is
/// the reuse predicate: a dataset that exists is trusted as-is, never
/// revalidated by content.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Returns the name of this repository implementation.
    fn name(&self) -> &str;

    /// Loads the artifact for `dataset`.
    ///
    /// Fails with [`RepositoryError::NotFound`] if no artifact has been
    /// persisted for the reference.
    async fn resolve(&self, dataset: &DatasetRef) -> Result<Artifact, RepositoryError>;

    /// Whether an artifact for `dataset` has been persisted.
    async fn exists(&self, dataset: &DatasetRef) -> bool;

    /// Durably stores `artifact` under `dataset`, replacing any previous one.
    async fn persist(&self, dataset: &DatasetRef, artifact: &Artifact)
        -> Result<(), RepositoryError>;
}
