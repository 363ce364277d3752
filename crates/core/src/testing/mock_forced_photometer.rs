//! Mock forced photometer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::ForcedPhotometryConfig;
use crate::stages::{
    DiaObject, DifferenceImage, ForcedPhotometer, ForcedSource, ForcedSourceCatalog, StageError,
};

/// A recorded forced-photometry invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedMeasurement {
    /// Objects flux was forced at.
    pub objects: Vec<DiaObject>,
    /// The difference image measured on.
    pub image: DifferenceImage,
}

/// Mock implementation of the ForcedPhotometer trait.
///
/// Provides controllable behavior for testing:
/// - Track which objects and image each invocation received
/// - Simulate success/failure
///
/// The default output carries one measurement per object, so tests can check
/// that every associated object was measured.
#[derive(Debug, Clone)]
pub struct MockForcedPhotometer {
    /// Recorded invocations, in order.
    calls: Arc<RwLock<Vec<RecordedMeasurement>>>,
    /// If set, the next invocation fails with this error.
    next_error: Arc<RwLock<Option<StageError>>>,
}

impl Default for MockForcedPhotometer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForcedPhotometer {
    /// Create a new mock forced photometer.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded invocations.
    pub async fn recorded_calls(&self) -> Vec<RecordedMeasurement> {
        self.calls.read().await.clone()
    }

    /// Get the number of invocations.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Configure the next invocation to fail with the given error.
    pub async fn set_next_error(&self, error: StageError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<StageError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl ForcedPhotometer for MockForcedPhotometer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn measure(
        &self,
        objects: &[DiaObject],
        image: &DifferenceImage,
        _config: &ForcedPhotometryConfig,
    ) -> Result<ForcedSourceCatalog, StageError> {
        self.calls.write().await.push(RecordedMeasurement {
            objects: objects.to_vec(),
            image: image.clone(),
        });

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(ForcedSourceCatalog {
            exposure: image.exposure,
            sources: objects
                .iter()
                .map(|object| ForcedSource {
                    object_id: object.id,
                    psf_flux: 1200.0,
                    psf_flux_err: image.noise_rms,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplateSource;
    use crate::exposure::ExposureRef;

    fn image() -> DifferenceImage {
        DifferenceImage {
            exposure: ExposureRef::new(413635, 42),
            template: TemplateSource::Coadd,
            noise_rms: 14.0,
        }
    }

    fn objects() -> Vec<DiaObject> {
        vec![
            DiaObject {
                id: 1,
                ra_deg: 150.1123,
                dec_deg: 2.2045,
                num_sources: 3,
            },
            DiaObject {
                id: 2,
                ra_deg: 150.1377,
                dec_deg: 2.1981,
                num_sources: 1,
            },
        ]
    }

    #[tokio::test]
    async fn test_one_measurement_per_object() {
        let photometer = MockForcedPhotometer::new();

        let catalog = photometer
            .measure(&objects(), &image(), &ForcedPhotometryConfig::default())
            .await
            .unwrap();

        assert_eq!(catalog.sources.len(), 2);
        assert_eq!(catalog.sources[0].object_id, 1);
        assert_eq!(catalog.sources[1].object_id, 2);
        assert_eq!(catalog.exposure, image().exposure);
    }

    #[tokio::test]
    async fn test_records_objects_and_image() {
        let photometer = MockForcedPhotometer::new();

        photometer
            .measure(&objects(), &image(), &ForcedPhotometryConfig::default())
            .await
            .unwrap();

        let calls = photometer.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].objects.len(), 2);
        assert_eq!(calls[0].image.noise_rms, 14.0);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let photometer = MockForcedPhotometer::new();
        photometer
            .set_next_error(StageError::failed("psf model missing"))
            .await;

        let result = photometer
            .measure(&objects(), &image(), &ForcedPhotometryConfig::default())
            .await;

        assert!(result.is_err());
        assert_eq!(photometer.call_count().await, 1);
    }
}
