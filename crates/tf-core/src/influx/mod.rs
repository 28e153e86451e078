//! InfluxDB 0.9+ JSON wire format.
//!
//! Pure data transformation between [`Point`](crate::Point)s and the JSON
//! write body / query response of the InfluxDB HTTP API. No I/O happens
//! here; an HTTP adapter sends [`WriteBody::to_json`] to `/write` and hands
//! the `/query` response text to [`decode_query_response`] or, for
//! `chunked=true`, [`decode_chunked_response`].

mod response;
mod write;

pub use response::{decode_chunked_response, decode_query_response};
pub use write::{encode_write_body, WireTimestamp, WriteBody, WirePoint};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tf_frame::Timestamp;

/// Errors of the wire codec.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("no points to write")]
    EmptyInput,

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("query {chunk} failed: {message}")]
    Query { chunk: usize, message: String },

    #[error("query {chunk}: measurement not found: {message}")]
    MeasurementNotFound { chunk: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WireError {
    pub fn code(&self) -> u32 {
        match self {
            WireError::EmptyInput => 60,
            WireError::InvalidData(_) => 61,
            WireError::Query { .. } => 62,
            WireError::MeasurementNotFound { .. } => 63,
            WireError::Json(_) => 64,
        }
    }

    /// Both query failure kinds.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            WireError::Query { .. } | WireError::MeasurementNotFound { .. }
        )
    }
}

/// Timestamp precision of integer wire timestamps.
///
/// Serialized as the wire code (`n`, `u`, `ms`, `s`); `ns` and `us` are
/// accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "n", alias = "ns")]
    Ns,
    #[serde(rename = "u", alias = "us")]
    Us,
    #[default]
    #[serde(rename = "ms")]
    Ms,
    #[serde(rename = "s")]
    S,
}

impl Precision {
    /// Wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Precision::Ns => "n",
            Precision::Us => "u",
            Precision::Ms => "ms",
            Precision::S => "s",
        }
    }

    /// Units since the epoch, truncated towards negative infinity.
    ///
    /// `None` when nanoseconds overflow `i64` (outside 1677..2262).
    pub fn to_int(&self, ts: Timestamp) -> Option<i64> {
        match self {
            Precision::Ns => ts.timestamp_nanos_opt(),
            Precision::Us => Some(ts.timestamp_micros()),
            Precision::Ms => Some(ts.timestamp_millis()),
            Precision::S => Some(ts.timestamp()),
        }
    }

    /// Inverse of [`Precision::to_int`].
    pub fn from_int(&self, value: i64) -> Option<Timestamp> {
        match self {
            Precision::Ns => Some(Utc.timestamp_nanos(value)),
            Precision::Us => DateTime::from_timestamp_micros(value),
            Precision::Ms => DateTime::from_timestamp_millis(value),
            Precision::S => DateTime::from_timestamp(value, 0),
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "n" | "ns" => Ok(Precision::Ns),
            "u" | "us" => Ok(Precision::Us),
            "ms" => Ok(Precision::Ms),
            "s" => Ok(Precision::S),
            other => Err(format!("unknown precision: {}", other)),
        }
    }
}

/// Write body options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    #[serde(default)]
    pub precision: Precision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_policy: Option<String>,
    /// RFC 3339 timestamps with nanoseconds instead of integers.
    #[serde(default)]
    pub use_iso_format: bool,
}

impl WriteOptions {
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_retention_policy(mut self, policy: impl Into<String>) -> Self {
        self.retention_policy = Some(policy.into());
        self
    }

    pub fn with_iso_format(mut self, enabled: bool) -> Self {
        self.use_iso_format = enabled;
        self
    }
}
