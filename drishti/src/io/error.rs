//! Error type for dump and points file I/O.

use thiserror::Error;

use crate::grid::EnvelopeError;

/// Errors raised while reading or writing dump directories and points files.
#[derive(Error, Debug)]
pub enum DumpError {
    /// Underlying file I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A sample file length is not a multiple of its element size.
    #[error("{file}: {len} bytes is not a multiple of the {element}-byte element size")]
    Misaligned {
        /// File name inside the dump directory
        file: &'static str,
        /// File length in bytes
        len: usize,
        /// Element size in bytes
        element: usize,
    },

    /// The parameter block has the wrong size.
    #[error("parameter block is {found} bytes, expected {expected}")]
    ParamsSize {
        /// Required size
        expected: usize,
        /// Actual size
        found: usize,
    },

    /// A parameter value cannot be used (negative size, offset or shift).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The voxel grid envelope in the parameter block is unusable.
    #[error("invalid grid envelope: {0}")]
    InvalidEnvelope(#[from] EnvelopeError),

    /// A points file line is not three integers.
    #[error("points line {line}: cannot parse '{content}'")]
    InvalidPointLine {
        /// 1-based line number
        line: usize,
        /// Offending line
        content: String,
    },
}
