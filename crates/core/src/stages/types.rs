//! Data handed between pipeline stages.
//!
//! These records are what the orchestrator moves from one stage to the next
//! and persists as artifacts. Their numeric content is produced and consumed
//! by stage implementations; the orchestrator only cares about identity and
//! flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TemplateSource;
use crate::exposure::ExposureRef;

// ============================================================================
// Stage inputs and outputs
// ============================================================================

/// Unprocessed exposure as delivered by the instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawExposure {
    /// The exposure this image belongs to.
    pub exposure: ExposureRef,
    /// Filter band the exposure was taken in.
    pub filter: String,
    /// Exposure time in seconds.
    pub exposure_time_s: f64,
    /// Observation timestamp.
    pub obs_date: DateTime<Utc>,
}

/// Calibrated exposure: instrumental-processing output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedExposure {
    /// The exposure this image belongs to.
    pub exposure: ExposureRef,
    /// Filter band of the underlying raw exposure.
    pub filter: String,
    /// Measured PSF full width at half maximum, in arcseconds.
    pub psf_fwhm_arcsec: f64,
    /// Photometric zero point, in magnitudes.
    pub zero_point_mag: f64,
    /// Background noise RMS, in counts.
    pub background_rms: f64,
}

/// Difference image metadata: differencing output minus the source catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DifferenceImage {
    /// The exposure the template was subtracted from.
    pub exposure: ExposureRef,
    /// Which template kind was used for the subtraction.
    pub template: TemplateSource,
    /// Noise RMS of the difference image, in counts.
    pub noise_rms: f64,
}

/// One detection in a difference image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaSource {
    /// Detection identifier, unique within the source catalog.
    pub id: i64,
    /// Right ascension, in degrees.
    pub ra_deg: f64,
    /// Declination, in degrees.
    pub dec_deg: f64,
    /// PSF-fitted flux, in counts.
    pub psf_flux: f64,
    /// Uncertainty of `psf_flux`.
    pub psf_flux_err: f64,
    /// Detection significance.
    pub snr: f64,
}

/// All sources detected in one difference image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceCatalog {
    /// The exposure the sources were detected in.
    pub exposure: ExposureRef,
    /// The detections.
    pub sources: Vec<DiaSource>,
}

/// Complete differencing-stage output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DifferenceResult {
    /// The difference image itself.
    pub image: DifferenceImage,
    /// Sources detected in it.
    pub sources: SourceCatalog,
}

/// One persistent sky object aggregating associated detections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaObject {
    /// Object identifier, unique within the association database.
    pub id: i64,
    /// Right ascension of the object centroid, in degrees.
    pub ra_deg: f64,
    /// Declination of the object centroid, in degrees.
    pub dec_deg: f64,
    /// Number of detections associated with this object so far.
    pub num_sources: u32,
}

/// Association-stage output: the updated object catalog for this exposure's
/// field, with match bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssociationResult {
    /// The exposure whose detections were associated.
    pub exposure: ExposureRef,
    /// Known objects after association, including any newly created ones.
    pub objects: Vec<DiaObject>,
    /// How many detections matched an existing object.
    pub matched: usize,
    /// How many new objects were created.
    pub created: usize,
}

/// Flux measured at one known object's position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForcedSource {
    /// The object the measurement was forced at.
    pub object_id: i64,
    /// PSF-fitted flux at the object position, in counts.
    pub psf_flux: f64,
    /// Uncertainty of `psf_flux`.
    pub psf_flux_err: f64,
}

/// Forced-photometry-stage output: one measurement per known object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForcedSourceCatalog {
    /// The exposure the measurements were made on.
    pub exposure: ExposureRef,
    /// The measurements.
    pub sources: Vec<ForcedSource>,
}
