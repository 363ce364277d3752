//! Stage capabilities and the data that flows between them.
//!
//! The pipeline's four stages are external collaborators behind narrow
//! traits: [`CcdProcessor`], [`Differencer`], [`Associator`] and
//! [`ForcedPhotometer`]. Each consumes the previous stage's output and fails
//! with a [`StageError`]; the orchestrator never looks inside a stage.

mod error;
mod traits;
mod types;

pub use error::StageError;
pub use traits::{Associator, CcdProcessor, Differencer, ForcedPhotometer};
pub use types::{
    AssociationResult, DiaObject, DiaSource, DifferenceImage, DifferenceResult, ForcedSource,
    ForcedSourceCatalog, ProcessedExposure, RawExposure, SourceCatalog,
};
