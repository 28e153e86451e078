//! Frame errors.

use thiserror::Error;

use crate::value::ValueKind;

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors from frame construction and Arrow conversion.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("column {column:?} has {actual} values, index has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column {0:?}")]
    DuplicateColumn(String),

    #[error("column {column:?} mixes {first} and {second} values")]
    MixedTypes {
        column: String,
        first: ValueKind,
        second: ValueKind,
    },

    #[error("column {column:?} has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    #[error("time column {0:?} not found")]
    MissingTimeColumn(String),

    #[error("null timestamp at row {row}")]
    NullTimestamp { row: usize },

    #[error("timestamp {0} out of range")]
    TimestampOutOfRange(String),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl FrameError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            FrameError::LengthMismatch { .. } => 30,
            FrameError::DuplicateColumn(_) => 31,
            FrameError::MixedTypes { .. } => 32,
            FrameError::UnsupportedType { .. } => 33,
            FrameError::MissingTimeColumn(_) => 34,
            FrameError::NullTimestamp { .. } => 35,
            FrameError::TimestampOutOfRange(_) => 36,
            FrameError::Arrow(_) => 37,
        }
    }
}
