//! Artifact repository: the pipeline's data-access layer.
//!
//! Every dataset the pipeline touches is addressed by a [`DatasetRef`]
//! (a [`DatasetKind`] for one exposure) and stored as an [`Artifact`], a JSON
//! envelope with a creation timestamp. The [`Repository`] trait exposes the
//! three operations the orchestrator needs: resolve, exists (the reuse
//! predicate), and persist. [`FsRepository`] is the filesystem-backed
//! implementation.

mod error;
mod fs_store;
mod store;
mod types;

pub use error::RepositoryError;
pub use fs_store::FsRepository;
pub use store::Repository;
pub use types::{Artifact, DatasetKind, DatasetRef};
