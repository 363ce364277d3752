//! Capability traits for the four pipeline stages.
//!
//! The orchestrator depends only on these traits, never on concrete stage
//! implementations. Each trait exposes a single processing operation plus a
//! name for logs; per-stage configuration is passed through from the run
//! configuration unmodified.

use async_trait::async_trait;

use super::error::StageError;
use super::types::{
    AssociationResult, DiaObject, DifferenceImage, DifferenceResult, ForcedSourceCatalog,
    ProcessedExposure, RawExposure, SourceCatalog,
};
use crate::apdb::Apdb;
use crate::config::{
    AssociationConfig, CcdProcessingConfig, DifferencingConfig, ForcedPhotometryConfig,
};

/// Instrumental processing: turns a raw exposure into a calibrated one.
#[async_trait]
pub trait CcdProcessor: Send + Sync {
    /// Returns the name of this processor implementation.
    fn name(&self) -> &str;

    /// Processes the raw exposure into a calibrated exposure.
    async fn process(
        &self,
        raw: &RawExposure,
        config: &CcdProcessingConfig,
    ) -> Result<ProcessedExposure, StageError>;
}

/// Image differencing: subtracts a reference template and detects sources.
///
/// The template is acquired by the implementation itself, selected by
/// `config.template`; a missing template is reported as
/// [`StageError::MissingPrecondition`].
#[async_trait]
pub trait Differencer: Send + Sync {
    /// Returns the name of this differencer implementation.
    fn name(&self) -> &str;

    /// Differences the calibrated exposure against its template and detects
    /// sources in the result.
    async fn difference(
        &self,
        calexp: &ProcessedExposure,
        config: &DifferencingConfig,
    ) -> Result<DifferenceResult, StageError>;
}

/// Source association: matches detections against the known-object catalog
/// in the association database, inserting new objects as needed.
///
/// This is a database mutation, not an artifact computation; implementations
/// own the idempotence of re-association (the orchestrator re-invokes this on
/// every run).
#[async_trait]
pub trait Associator: Send + Sync {
    /// Returns the name of this associator implementation.
    fn name(&self) -> &str;

    /// Associates the detected sources with known objects through the given
    /// database connection.
    async fn associate(
        &self,
        sources: &SourceCatalog,
        apdb: &Apdb,
        config: &AssociationConfig,
    ) -> Result<AssociationResult, StageError>;
}

/// Forced photometry: measures flux at every known object's position on the
/// difference image, whether or not the object was detected this visit.
#[async_trait]
pub trait ForcedPhotometer: Send + Sync {
    /// Returns the name of this photometer implementation.
    fn name(&self) -> &str;

    /// Measures flux at each object position on the difference image.
    async fn measure(
        &self,
        objects: &[DiaObject],
        image: &DifferenceImage,
        config: &ForcedPhotometryConfig,
    ) -> Result<ForcedSourceCatalog, StageError>;
}
