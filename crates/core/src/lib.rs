pub mod apdb;
pub mod config;
pub mod exposure;
pub mod metrics;
pub mod pipeline;
pub mod repository;
pub mod stages;
pub mod testing;

pub use apdb::{Apdb, ApdbError};
pub use config::{
    load_config, load_config_from_str, validate_config, ConfigError, IsolationLevel,
    PipelineConfig, TemplateSource,
};
pub use exposure::ExposureRef;
pub use pipeline::{DiaPipeline, PipelineError, Provenance, RunResult, StageKind, StageOutcome};
pub use repository::{Artifact, DatasetKind, DatasetRef, FsRepository, Repository, RepositoryError};
pub use stages::{Associator, CcdProcessor, Differencer, ForcedPhotometer, StageError};
