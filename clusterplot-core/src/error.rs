//! Error types for clusterplot-core.

use crate::event::Field;
use thiserror::Error;

/// Result type alias for clusterplot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for clusterplot operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration error (invalid binning, drift constants, ...).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Two aggregates with different binning cannot be merged.
    #[error("binning mismatch: cannot merge '{left}' with '{right}'")]
    BinningMismatch { left: String, right: String },
}

/// Structural defect of a single event.
///
/// Defects are not errors of the run: the analysis skips the event and
/// only reports the total number of skipped events.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDefect {
    /// A required sequence is absent.
    #[error("required field '{0}' is absent")]
    MissingField(Field),

    /// A required sequence is shorter than `PeakTime`.
    #[error("field '{field}' has {len} values, expected {expected}")]
    LengthMismatch {
        field: Field,
        len: usize,
        expected: usize,
    },
}
