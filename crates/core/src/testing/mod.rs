//! Testing utilities and mock implementations for orchestration tests.
//!
//! This module provides mock implementations of the four stage capability
//! traits and the artifact repository, allowing full pipeline runs without
//! real image processing or storage infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use diapipe_core::testing::{MockCcdProcessor, MockRepository};
//!
//! let repository = MockRepository::new();
//! let ccd_processor = MockCcdProcessor::new();
//!
//! // Seed the raw input the run will resolve
//! repository.preload(raw_ref, &raw_exposure).await;
//!
//! // Inject a failure for the next invocation
//! ccd_processor.set_next_error(StageError::failed("saturated")).await;
//!
//! // Use in DiaPipeline::new...
//! ```

mod mock_associator;
mod mock_ccd_processor;
mod mock_differencer;
mod mock_forced_photometer;
mod mock_repository;

pub use mock_associator::MockAssociator;
pub use mock_ccd_processor::MockCcdProcessor;
pub use mock_differencer::MockDifferencer;
pub use mock_forced_photometer::{MockForcedPhotometer, RecordedMeasurement};
pub use mock_repository::MockRepository;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::exposure::ExposureRef;
    use crate::stages::{DiaSource, RawExposure};

    /// Create a test raw exposure with reasonable defaults.
    pub fn raw_exposure(visit: u32, detector: u32) -> RawExposure {
        RawExposure {
            exposure: ExposureRef::new(visit, detector),
            filter: "g".to_string(),
            exposure_time_s: 30.0,
            obs_date: Utc.with_ymd_and_hms(2024, 3, 15, 4, 12, 0).unwrap(),
        }
    }

    /// Create a test detection at the given position.
    pub fn dia_source(id: i64, ra_deg: f64, dec_deg: f64) -> DiaSource {
        DiaSource {
            id,
            ra_deg,
            dec_deg,
            psf_flux: 850.0,
            psf_flux_err: 42.0,
            snr: 850.0 / 42.0,
        }
    }
}
