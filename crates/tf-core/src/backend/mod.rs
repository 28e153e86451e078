//! Backend adapter interface.
//!
//! The core reaches a time-series store only through [`Backend`]. Adapters
//! own transport, authentication and query language; failures come back as
//! [`BackendError`] and are passed to the caller unchanged.

mod memory;

pub use memory::MemoryBackend;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tf_frame::Timestamp;

use crate::error::BackendError;
use crate::point::Point;

/// Lazy stream of query results.
pub type PointStream<'a> = Box<dyn Iterator<Item = Result<Point, BackendError>> + 'a>;

/// Half-open time interval `[start, end)`; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
}

impl TimeRange {
    /// The unbounded range.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        TimeRange { start, end }
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts < e)
    }
}

/// Equality match on one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagFilter {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Points of one measurement within a time range, filtered by tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub measurement: String,
    #[serde(default)]
    pub range: TimeRange,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<TagFilter>,
}

impl Query {
    pub fn new(measurement: impl Into<String>) -> Self {
        Query {
            measurement: measurement.into(),
            range: TimeRange::all(),
            filters: Vec::new(),
        }
    }

    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_filter(mut self, filter: TagFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// True when `point` satisfies measurement, range and every filter.
    pub fn matches(&self, point: &Point) -> bool {
        point.measurement == self.measurement
            && self.range.contains(point.timestamp)
            && point.matches_tags(
                self.filters
                    .iter()
                    .map(|f| (f.key.as_str(), f.value.as_str())),
            )
    }
}

/// A point the backend refused, by position in the written slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedPoint {
    pub index: usize,
    pub reason: String,
}

/// Outcome of a write that the backend accepted as a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub accepted: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedPoint>,
}

impl WriteSummary {
    /// Every point accepted.
    pub fn all(accepted: usize) -> Self {
        WriteSummary {
            accepted,
            rejected: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Capability contract of a time-series store.
///
/// Methods take `&mut self`: one adapter instance serves one operation at a
/// time.
pub trait Backend {
    /// Persist points. Adapters that cannot report per-point outcomes
    /// return `Err` for the whole request instead.
    fn write(&mut self, points: &[Point]) -> Result<WriteSummary, BackendError>;

    /// Run a query and stream its points.
    fn query(&mut self, query: &Query) -> Result<PointStream<'_>, BackendError>;

    /// Every measurement known to the backend.
    fn list_measurements(&mut self) -> Result<BTreeSet<String>, BackendError> {
        Err(BackendError::unsupported("list_measurements"))
    }
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn write(&mut self, points: &[Point]) -> Result<WriteSummary, BackendError> {
        (**self).write(points)
    }

    fn query(&mut self, query: &Query) -> Result<PointStream<'_>, BackendError> {
        (**self).query(query)
    }

    fn list_measurements(&mut self) -> Result<BTreeSet<String>, BackendError> {
        (**self).list_measurements()
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn write(&mut self, points: &[Point]) -> Result<WriteSummary, BackendError> {
        (**self).write(points)
    }

    fn query(&mut self, query: &Query) -> Result<PointStream<'_>, BackendError> {
        (**self).query(query)
    }

    fn list_measurements(&mut self) -> Result<BTreeSet<String>, BackendError> {
        (**self).list_measurements()
    }
}
