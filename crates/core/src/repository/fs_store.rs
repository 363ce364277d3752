//! Filesystem-backed repository implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::RepositoryError;
use super::store::Repository;
use super::types::{Artifact, DatasetRef};

/// Repository storing artifacts as JSON documents on the local filesystem.
///
/// Layout: `<root>/<kind>/<visit>-<detector>.json`. A dataset exists exactly
/// when its file does, which is what the pipeline's reuse checks key off.
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    /// Creates a repository rooted at the given directory.
    ///
    /// The directory does not need to exist yet; it is created on first
    /// persist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the repository.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_path(&self, dataset: &DatasetRef) -> PathBuf {
        self.root.join(dataset.kind.as_str()).join(format!(
            "{:06}-{:03}.json",
            dataset.exposure.visit, dataset.exposure.detector
        ))
    }
}

#[async_trait]
impl Repository for FsRepository {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn resolve(&self, dataset: &DatasetRef) -> Result<Artifact, RepositoryError> {
        let path = self.dataset_path(dataset);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(*dataset));
            }
            Err(e) => return Err(RepositoryError::read(*dataset, e)),
        };

        serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Decode {
            dataset: *dataset,
            reason: e.to_string(),
        })
    }

    async fn exists(&self, dataset: &DatasetRef) -> bool {
        fs::try_exists(self.dataset_path(dataset))
            .await
            .unwrap_or(false)
    }

    async fn persist(
        &self,
        dataset: &DatasetRef,
        artifact: &Artifact,
    ) -> Result<(), RepositoryError> {
        let path = self.dataset_path(dataset);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::write(*dataset, e))?;
        }

        let bytes = serde_json::to_vec_pretty(artifact).map_err(|e| RepositoryError::Encode {
            dataset: *dataset,
            reason: e.to_string(),
        })?;

        fs::write(&path, bytes)
            .await
            .map_err(|e| RepositoryError::write(*dataset, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::ExposureRef;
    use crate::repository::types::DatasetKind;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        label: String,
    }

    fn test_dataset() -> DatasetRef {
        DatasetRef::new(DatasetKind::Calexp, ExposureRef::new(413635, 42))
    }

    #[tokio::test]
    async fn test_persist_then_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsRepository::new(dir.path());
        let dataset = test_dataset();

        let payload = Payload {
            label: "processed".to_string(),
        };
        let artifact = Artifact::from_payload(dataset, &payload).unwrap();

        assert!(!repo.exists(&dataset).await);
        repo.persist(&dataset, &artifact).await.unwrap();
        assert!(repo.exists(&dataset).await);

        let resolved = repo.resolve(&dataset).await.unwrap();
        let back: Payload = resolved.decode().unwrap();
        assert_eq!(back, payload);
    }

    #[tokio::test]
    async fn test_resolve_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsRepository::new(dir.path());

        let result = repo.resolve(&test_dataset()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_persist_replaces_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsRepository::new(dir.path());
        let dataset = test_dataset();

        let first = Artifact::from_payload(
            dataset,
            &Payload {
                label: "first".to_string(),
            },
        )
        .unwrap();
        let second = Artifact::from_payload(
            dataset,
            &Payload {
                label: "second".to_string(),
            },
        )
        .unwrap();

        repo.persist(&dataset, &first).await.unwrap();
        repo.persist(&dataset, &second).await.unwrap();

        let resolved = repo.resolve(&dataset).await.unwrap();
        let back: Payload = resolved.decode().unwrap();
        assert_eq!(back.label, "second");
    }

    #[tokio::test]
    async fn test_datasets_are_separated_by_kind_and_exposure() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsRepository::new(dir.path());

        let calexp = DatasetRef::new(DatasetKind::Calexp, ExposureRef::new(413635, 42));
        let difference = DatasetRef::new(DatasetKind::Difference, ExposureRef::new(413635, 42));
        let other_detector = DatasetRef::new(DatasetKind::Calexp, ExposureRef::new(413635, 43));

        let artifact = Artifact::from_payload(
            calexp,
            &Payload {
                label: "calexp".to_string(),
            },
        )
        .unwrap();
        repo.persist(&calexp, &artifact).await.unwrap();

        assert!(repo.exists(&calexp).await);
        assert!(!repo.exists(&difference).await);
        assert!(!repo.exists(&other_detector).await);
    }

    #[tokio::test]
    async fn test_corrupt_artifact_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsRepository::new(dir.path());
        let dataset = test_dataset();

        let path = repo.dataset_path(&dataset);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        let result = repo.resolve(&dataset).await;
        assert!(matches!(result, Err(RepositoryError::Decode { .. })));
    }
}
