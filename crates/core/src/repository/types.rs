//! Dataset naming and the artifact envelope.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::RepositoryError;
use crate::exposure::ExposureRef;

/// The kinds of dataset the pipeline reads and writes.
///
/// Each pipeline stage owns one output kind; `Raw` is the pipeline's input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Unprocessed exposure as read from the instrument.
    Raw,
    /// Calibrated exposure, the instrumental-processing output.
    Calexp,
    /// Difference image together with its detected-source catalog.
    Difference,
    /// Snapshot of the updated object catalog after association.
    DiaObjects,
    /// Forced photometry measurements.
    ForcedSources,
}

impl DatasetKind {
    /// Stable name used for storage paths and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Calexp => "calexp",
            Self::Difference => "difference",
            Self::DiaObjects => "dia_objects",
            Self::ForcedSources => "forced_sources",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical name of one persisted artifact: a dataset kind for one exposure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DatasetRef {
    /// Which kind of dataset this refers to.
    pub kind: DatasetKind,
    /// The exposure the dataset belongs to.
    pub exposure: ExposureRef,
}

impl DatasetRef {
    /// Creates a reference to `kind` for the given exposure.
    pub fn new(kind: DatasetKind, exposure: ExposureRef) -> Self {
        Self { kind, exposure }
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.exposure)
    }
}

/// The unit the repository stores and resolves.
///
/// Carries an opaque JSON payload so the repository does not need to know
/// stage payload types; the orchestrator encodes and decodes at its own seam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// The dataset this artifact realizes.
    pub dataset: DatasetRef,
    /// When the artifact was produced.
    pub created_at: DateTime<Utc>,
    /// Serialized dataset content.
    pub payload: serde_json::Value,
}

impl Artifact {
    /// Wraps a serializable payload into an artifact for `dataset`.
    pub fn from_payload<T: Serialize>(
        dataset: DatasetRef,
        payload: &T,
    ) -> Result<Self, RepositoryError> {
        let payload =
            serde_json::to_value(payload).map_err(|e| RepositoryError::Encode {
                dataset,
                reason: e.to_string(),
            })?;
        Ok(Self {
            dataset,
            created_at: Utc::now(),
            payload,
        })
    }

    /// Decodes the payload back into its concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RepositoryError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| RepositoryError::Decode {
            dataset: self.dataset,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn test_dataset_ref_display() {
        let dataset = DatasetRef::new(DatasetKind::Calexp, ExposureRef::new(413635, 42));
        assert_eq!(dataset.to_string(), "calexp (visit=413635 detector=42)");
    }

    #[test]
    fn test_artifact_roundtrip() {
        let dataset = DatasetRef::new(DatasetKind::Raw, ExposureRef::new(1, 2));
        let artifact = Artifact::from_payload(dataset, &Payload { value: 7 }).unwrap();

        let back: Payload = artifact.decode().unwrap();
        assert_eq!(back, Payload { value: 7 });
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        let dataset = DatasetRef::new(DatasetKind::Raw, ExposureRef::new(1, 2));
        let artifact = Artifact::from_payload(dataset, &"just a string").unwrap();

        let result: Result<Payload, _> = artifact.decode();
        assert!(matches!(result, Err(RepositoryError::Decode { .. })));
    }
}
