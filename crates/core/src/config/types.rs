use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root run configuration.
///
/// Validated once (see [`validate_config`](super::validate_config)), then
/// read-only for the duration of every run. The per-stage sections are passed
/// through to the stage capabilities unmodified; the orchestrator never
/// interprets their science knobs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub apdb: ApdbConfig,
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub ccd_processing: CcdProcessingConfig,
    #[serde(default)]
    pub differencing: DifferencingConfig,
    #[serde(default)]
    pub association: AssociationConfig,
    #[serde(default)]
    pub forced_photometry: ForcedPhotometryConfig,
}

/// Association database connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApdbConfig {
    /// Connection URL. `sqlite://` selects a private in-memory database;
    /// `sqlite://<path>` a database file that must already exist.
    #[serde(default = "default_apdb_url")]
    pub url: String,
    /// Transaction isolation requested from the backend.
    #[serde(default)]
    pub isolation_level: IsolationLevel,
}

impl Default for ApdbConfig {
    fn default() -> Self {
        Self {
            url: default_apdb_url(),
            isolation_level: IsolationLevel::default(),
        }
    }
}

fn default_apdb_url() -> String {
    "sqlite://".to_string()
}

/// Transaction isolation levels accepted in configuration.
///
/// Which of these a backend can actually provide is decided at connect time;
/// the orchestrator passes the setting through unmodified.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IsolationLevel {
    #[default]
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadUncommitted => "READ_UNCOMMITTED",
            Self::ReadCommitted => "READ_COMMITTED",
            Self::RepeatableRead => "REPEATABLE_READ",
            Self::Serializable => "SERIALIZABLE",
        };
        f.write_str(name)
    }
}

/// Artifact repository settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    /// Root directory artifacts are stored under.
    #[serde(default = "default_repository_root")]
    pub root: PathBuf,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            root: default_repository_root(),
        }
    }
}

fn default_repository_root() -> PathBuf {
    PathBuf::from("data/repo")
}

/// Instrumental-processing stage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CcdProcessingConfig {
    /// Whether to run photometric and astrometric calibration.
    #[serde(default = "default_true")]
    pub calibrate: bool,
}

impl Default for CcdProcessingConfig {
    fn default() -> Self {
        Self { calibrate: true }
    }
}

/// Differencing stage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DifferencingConfig {
    /// Which kind of reference image to subtract.
    #[serde(default)]
    pub template: TemplateSource,
    /// Source detection threshold on the difference image, in sigma.
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: f64,
}

impl Default for DifferencingConfig {
    fn default() -> Self {
        Self {
            template: TemplateSource::default(),
            detection_threshold: default_detection_threshold(),
        }
    }
}

fn default_detection_threshold() -> f64 {
    5.0
}

/// Reference image kinds a differencer can subtract.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    /// Coadded template built from many earlier epochs.
    #[default]
    Coadd,
    /// Single calibrated exposure from an earlier epoch.
    Calexp,
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Coadd => "coadd",
            Self::Calexp => "calexp",
        };
        f.write_str(name)
    }
}

/// Association stage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssociationConfig {
    /// Maximum source-to-object match distance, in arcseconds.
    #[serde(default = "default_match_radius")]
    pub match_radius_arcsec: f64,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            match_radius_arcsec: default_match_radius(),
        }
    }
}

fn default_match_radius() -> f64 {
    1.0
}

/// Forced-photometry stage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForcedPhotometryConfig {
    /// Measure PSF-fitted flux at each object position.
    #[serde(default = "default_true")]
    pub psf_flux: bool,
    /// Measure aperture flux at each object position.
    #[serde(default)]
    pub aperture_flux: bool,
}

impl Default for ForcedPhotometryConfig {
    fn default() -> Self {
        Self {
            psf_flux: true,
            aperture_flux: false,
        }
    }
}

fn default_true() -> bool {
    true
}
