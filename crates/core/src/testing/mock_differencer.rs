//! Mock differencer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::DifferencingConfig;
use crate::stages::{
    DiaSource, DifferenceImage, DifferenceResult, Differencer, ProcessedExposure, SourceCatalog,
    StageError,
};

/// Mock implementation of the Differencer trait.
///
/// Provides controllable behavior for testing:
/// - Track calexps handed in for assertions
/// - Simulate success/failure (e.g. a missing template)
/// - Control the detections placed in the source catalog
#[derive(Debug, Clone)]
pub struct MockDifferencer {
    /// Recorded inputs, in invocation order.
    calls: Arc<RwLock<Vec<ProcessedExposure>>>,
    /// If set, the next invocation fails with this error.
    next_error: Arc<RwLock<Option<StageError>>>,
    /// Detections to report for every difference image.
    detections: Arc<RwLock<Vec<DiaSource>>>,
}

impl Default for MockDifferencer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDifferencer {
    /// Create a new mock differencer with two default detections.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            detections: Arc::new(RwLock::new(vec![
                super::fixtures::dia_source(1, 150.1123, 2.2045),
                super::fixtures::dia_source(2, 150.1377, 2.1981),
            ])),
        }
    }

    /// Get all recorded inputs.
    pub async fn recorded_calls(&self) -> Vec<ProcessedExposure> {
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

    /// Replace the detections reported in every source catalog.
    pub async fn set_detections(&self, detections: Vec<DiaSource>) {
        *self.detections.write().await = detections;
    }

    async fn take_error(&self) -> Option<StageError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Differencer for MockDifferencer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn difference(
        &self,
        calexp: &ProcessedExposure,
        config: &DifferencingConfig,
    ) -> Result<DifferenceResult, StageError> {
        self.calls.write().await.push(calexp.clone());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(DifferenceResult {
            image: DifferenceImage {
                exposure: calexp.exposure,
                template: config.template,
                noise_rms: calexp.background_rms * 1.4,
            },
            sources: SourceCatalog {
                exposure: calexp.exposure,
                sources: self.detections.read().await.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplateSource;
    use crate::testing::fixtures;

    fn calexp() -> ProcessedExposure {
        ProcessedExposure {
            exposure: crate::exposure::ExposureRef::new(413635, 42),
            filter: "g".to_string(),
            psf_fwhm_arcsec: 0.8,
            zero_point_mag: 27.0,
            background_rms: 10.0,
        }
    }

    #[tokio::test]
    async fn test_output_carries_configured_template() {
        let differencer = MockDifferencer::new();
        let config = DifferencingConfig {
            template: TemplateSource::Calexp,
            ..Default::default()
        };

        let result = differencer.difference(&calexp(), &config).await.unwrap();

        assert_eq!(result.image.template, TemplateSource::Calexp);
        assert_eq!(result.sources.exposure, calexp().exposure);
        assert_eq!(result.sources.sources.len(), 2);
    }

    #[tokio::test]
    async fn test_detections_are_configurable() {
        let differencer = MockDifferencer::new();
        differencer
            .set_detections(vec![fixtures::dia_source(7, 10.0, -5.0)])
            .await;

        let result = differencer
            .difference(&calexp(), &DifferencingConfig::default())
            .await
            .unwrap();

        assert_eq!(result.sources.sources.len(), 1);
        assert_eq!(result.sources.sources[0].id, 7);
    }

    #[tokio::test]
    async fn test_missing_template_error() {
        let differencer = MockDifferencer::new();
        differencer
            .set_next_error(StageError::missing_precondition("coadd template"))
            .await;

        let result = differencer
            .difference(&calexp(), &DifferencingConfig::default())
            .await;

        assert!(matches!(
            result,
            Err(StageError::MissingPrecondition { .. })
        ));
        assert_eq!(differencer.call_count().await, 1);
    }
}
