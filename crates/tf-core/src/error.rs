//! Error types for projection, assembly and backend access.
//!
//! Error codes are stable and grouped by category:
//! - 10-19: Invalid names (`tf_codec::InvalidNameError`)
//! - 20-29: Input errors
//! - 30-39: Frame errors (`tf_frame::FrameError`)
//! - 40-49: Schema errors
//! - 50-59: Backend errors
//! - 60-69: Wire format errors
//! - 70-79: Configuration errors

use thiserror::Error;

use tf_codec::InvalidNameError;
use tf_frame::{FrameError, Timestamp, Value};

use crate::config::ConfigError;
use crate::influx::WireError;

/// Result type alias for tsframe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Ambiguity detected while projecting or assembling a batch.
///
/// Always fails the whole batch; nothing is silently dropped or merged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Two field columns decode to the same `(namespace, leaf)`.
    #[error("columns {first:?} and {second:?} both map to field {leaf:?} of measurement {namespace:?}")]
    DuplicateField {
        namespace: String,
        leaf: String,
        first: String,
        second: String,
    },

    /// Two tag columns map to the same tag key.
    #[error("columns {first:?} and {second:?} both map to tag {key:?}")]
    DuplicateTag {
        key: String,
        first: String,
        second: String,
    },

    /// Two points merged into one row disagree on a column.
    #[error("conflicting values for {column:?} at {timestamp}: {existing} vs {incoming}")]
    Conflict {
        timestamp: Timestamp,
        column: String,
        existing: Value,
        incoming: Value,
    },
}

impl SchemaError {
    pub fn code(&self) -> u32 {
        match self {
            SchemaError::DuplicateField { .. } => 40,
            SchemaError::DuplicateTag { .. } => 41,
            SchemaError::Conflict { .. } => 42,
        }
    }
}

/// Coarse classification of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// The adapter does not implement the capability.
    Unsupported,
    /// The backend refused the request as a whole.
    Rejected,
    /// Transport or storage failure.
    Io,
    Other,
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendErrorKind::Unsupported => write!(f, "unsupported"),
            BackendErrorKind::Rejected => write!(f, "rejected"),
            BackendErrorKind::Io => write!(f, "io"),
            BackendErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Opaque failure raised by a backend adapter.
///
/// The core never inspects or retries these; they reach the caller as-is.
#[derive(Error, Debug)]
#[error("backend error ({kind}): {message}")]
pub struct BackendError {
    kind: BackendErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        BackendError {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Capability not implemented by this adapter.
    pub fn unsupported(capability: &str) -> Self {
        Self::new(
            BackendErrorKind::Unsupported,
            format!("{} is not supported", capability),
        )
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> BackendErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> u32 {
        match self.kind {
            BackendErrorKind::Unsupported => 50,
            BackendErrorKind::Rejected => 51,
            BackendErrorKind::Io => 52,
            BackendErrorKind::Other => 59,
        }
    }
}

/// Unified error type for tsframe.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    #[error("no storable data: {0}")]
    EmptyInput(String),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("wire format error: {0}")]
    Wire(#[from] WireError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidName(e) => e.code(),
            Error::EmptyInput(_) => 20,
            Error::Frame(e) => e.code(),
            Error::Schema(e) => e.code(),
            Error::Backend(e) => e.code(),
            Error::Wire(e) => e.code(),
            Error::Config(e) => e.code(),
        }
    }
}
