//! In-memory backend.

use std::collections::{BTreeMap, BTreeSet};

use super::{Backend, PointStream, Query, RejectedPoint, WriteSummary};
use crate::error::BackendError;
use crate::point::Point;

/// Stores points per measurement in insertion order.
///
/// Points without a measurement or without fields are rejected one by one;
/// the rest of the write goes through.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    series: BTreeMap<String, Vec<Point>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored points of one measurement.
    pub fn points(&self, measurement: &str) -> &[Point] {
        self.series
            .get(measurement)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total stored points.
    pub fn len(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    fn validate(point: &Point) -> Result<(), String> {
        if point.measurement.is_empty() {
            return Err("empty measurement".to_string());
        }
        if point.fields.is_empty() {
            return Err(format!("point in {:?} has no fields", point.measurement));
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn write(&mut self, points: &[Point]) -> Result<WriteSummary, BackendError> {
        let mut summary = WriteSummary::default();
        for (index, point) in points.iter().enumerate() {
            match Self::validate(point) {
                Ok(()) => {
                    self.series
                        .entry(point.measurement.clone())
                        .or_default()
                        .push(point.clone());
                    summary.accepted += 1;
                }
                Err(reason) => summary.rejected.push(RejectedPoint { index, reason }),
            }
        }
        Ok(summary)
    }

    fn query(&mut self, query: &Query) -> Result<PointStream<'_>, BackendError> {
        let query = query.clone();
        let stored = self.points(&query.measurement);
        Ok(Box::new(
            stored
                .iter()
                .filter(move |p| query.matches(p))
                .cloned()
                .map(Ok::<Point, BackendError>),
        ))
    }

    fn list_measurements(&mut self) -> Result<BTreeSet<String>, BackendError> {
        Ok(self.series.keys().cloned().collect())
    }
}
