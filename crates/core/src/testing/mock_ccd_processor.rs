//! Mock CCD processor for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::CcdProcessingConfig;
use crate::stages::{CcdProcessor, ProcessedExposure, RawExposure, StageError};

/// Mock implementation of the CcdProcessor trait.
///
/// Provides controllable behavior for testing:
/// - Track processed raw exposures for assertions
/// - Simulate success/failure
/// - Override the produced calexp
#[derive(Debug, Clone)]
pub struct MockCcdProcessor {
    /// Recorded inputs, in invocation order.
    calls: Arc<RwLock<Vec<RawExposure>>>,
    /// If set, the next invocation fails with this error.
    next_error: Arc<RwLock<Option<StageError>>>,
    /// If set, returned instead of the derived default output.
    output: Arc<RwLock<Option<ProcessedExposure>>>,
}

impl Default for MockCcdProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCcdProcessor {
    /// Create a new mock CCD processor.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            output: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded inputs.
    pub async fn recorded_calls(&self) -> Vec<RawExposure> {
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

    /// Override the output returned on success.
    pub async fn set_output(&self, output: ProcessedExposure) {
        *self.output.write().await = Some(output);
    }

    async fn take_error(&self) -> Option<StageError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl CcdProcessor for MockCcdProcessor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn process(
        &self,
        raw: &RawExposure,
        _config: &CcdProcessingConfig,
    ) -> Result<ProcessedExposure, StageError> {
        self.calls.write().await.push(raw.clone());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        if let Some(output) = self.output.read().await.as_ref() {
            return Ok(output.clone());
        }

        Ok(ProcessedExposure {
            exposure: raw.exposure,
            filter: raw.filter.clone(),
            psf_fwhm_arcsec: 0.8,
            zero_point_mag: 27.0,
            background_rms: 12.5,
        })
    }
}
