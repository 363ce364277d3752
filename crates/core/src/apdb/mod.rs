//! Association database (APDB) connection capability.
//!
//! The APDB holds the persistent known-object catalog the association stage
//! mutates. The orchestrator's only responsibilities here are opening a
//! connection from the run configuration and verifying it before the
//! association stage runs; everything the associator does with the
//! connection, including schema and idempotence, belongs to the associator.

mod connection;
mod error;

pub use connection::Apdb;
pub use error::ApdbError;
