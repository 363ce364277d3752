//! Exposure identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a single detector exposure.
///
/// Identifies one input image by its composite key: the visit number of the
/// observation and the detector that captured it. Every dataset the pipeline
/// reads or writes is addressed by one of these. Immutable once constructed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExposureRef {
    /// Visit number of the observation.
    pub visit: u32,
    /// Detector number within the focal plane.
    pub detector: u32,
}

impl ExposureRef {
    /// Creates a reference for the given visit/detector pair.
    pub fn new(visit: u32, detector: u32) -> Self {
        Self { visit, detector }
    }
}

impl fmt::Display for ExposureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visit={} detector={}", self.visit, self.detector)
    }
}
