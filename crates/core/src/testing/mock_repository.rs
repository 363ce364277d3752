//! Mock artifact repository for testing.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::repository::{Artifact, DatasetRef, Repository, RepositoryError};

/// Mock implementation of the Repository trait.
///
/// Stores artifacts in memory, so persisted outputs survive across runs on
/// the same instance (which is what the reuse tests need). Provides
/// controllable behavior for testing:
/// - Preload artifacts (e.g. the raw input a run must resolve)
/// - Track which datasets were persisted, in order
/// - Simulate resolve/persist failures
#[derive(Debug, Clone)]
pub struct MockRepository {
    /// Stored artifacts by dataset reference.
    artifacts: Arc<RwLock<HashMap<DatasetRef, Artifact>>>,
    /// Datasets persisted through the trait, in order.
    persisted: Arc<RwLock<Vec<DatasetRef>>>,
    /// If set, the next resolve or persist fails with this error.
    next_error: Arc<RwLock<Option<RepositoryError>>>,
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRepository {
    /// Create a new, empty mock repository.
    pub fn new() -> Self {
        Self {
            artifacts: Arc::new(RwLock::new(HashMap::new())),
            persisted: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Preload a payload as a stored artifact, bypassing call recording.
    pub async fn preload<T: Serialize>(&self, dataset: DatasetRef, payload: &T) {
        let artifact =
            Artifact::from_payload(dataset, payload).expect("preload payload must serialize");
        self.artifacts.write().await.insert(dataset, artifact);
    }

    /// Remove a stored artifact.
    pub async fn remove(&self, dataset: &DatasetRef) {
        self.artifacts.write().await.remove(dataset);
    }

    /// Get the datasets persisted through the trait, in order.
    pub async fn persisted_datasets(&self) -> Vec<DatasetRef> {
        self.persisted.read().await.clone()
    }

    /// Get the number of persist calls.
    pub async fn persist_count(&self) -> usize {
        self.persisted.read().await.len()
    }

    /// Configure the next resolve or persist to fail with the given error.
    pub async fn set_next_error(&self, error: RepositoryError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<RepositoryError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Repository for MockRepository {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve(&self, dataset: &DatasetRef) -> Result<Artifact, RepositoryError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.artifacts
            .read()
            .await
            .get(dataset)
            .cloned()
            .ok_or(RepositoryError::NotFound(*dataset))
    }

    async fn exists(&self, dataset: &DatasetRef) -> bool {
        self.artifacts.read().await.contains_key(dataset)
    }

    async fn persist(
        &self,
        dataset: &DatasetRef,
        artifact: &Artifact,
    ) -> Result<(), RepositoryError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.artifacts.write().await.insert(*dataset, artifact.clone());
        self.persisted.write().await.push(*dataset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::ExposureRef;
    use crate::repository::DatasetKind;

    fn dataset() -> DatasetRef {
        DatasetRef::new(DatasetKind::Raw, ExposureRef::new(413635, 42))
    }

    #[tokio::test]
    async fn test_preload_then_resolve() {
        let repository = MockRepository::new();
        repository.preload(dataset(), &"payload").await;

        assert!(repository.exists(&dataset()).await);
        let artifact = repository.resolve(&dataset()).await.unwrap();
        let payload: String = artifact.decode().unwrap();
        assert_eq!(payload, "payload");

        // Preloading does not count as a persist call.
        assert_eq!(repository.persist_count().await, 0);
    }

    #[tokio::test]
    async fn test_resolve_missing_is_not_found() {
        let repository = MockRepository::new();
        let result = repository.resolve(&dataset()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_persist_is_recorded_and_visible() {
        let repository = MockRepository::new();
        let artifact = Artifact::from_payload(dataset(), &42u32).unwrap();

        repository.persist(&dataset(), &artifact).await.unwrap();

        assert!(repository.exists(&dataset()).await);
        assert_eq!(repository.persisted_datasets().await, vec![dataset()]);
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let repository = MockRepository::new();
        repository.preload(dataset(), &1u32).await;
        repository
            .set_next_error(RepositoryError::NotFound(dataset()))
            .await;

        assert!(repository.resolve(&dataset()).await.is_err());
        assert!(repository.resolve(&dataset()).await.is_ok());
    }
}
