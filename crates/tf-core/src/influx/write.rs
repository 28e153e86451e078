//! Write body encoding.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tf_frame::{Timestamp, Value};

use super::{Precision, WireError, WriteOptions};
use crate::point::{FieldSet, Point, TagSet};

/// Integer in the body's precision, or RFC 3339 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Int(i64),
    Iso(String),
}

/// One point of a write body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
    pub fields: FieldSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<WireTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<Precision>,
}

/// JSON body for the `/write` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(
        rename = "retentionPolicy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub retention_policy: Option<String>,
    pub precision: Precision,
    /// Shared by every point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<WireTimestamp>,
    /// Shared by every point.
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
    pub points: Vec<WirePoint>,
}

impl WriteBody {
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, WireError> {
        Ok(serde_json::to_value(self)?)
    }
}

fn wire_timestamp(ts: Timestamp, options: &WriteOptions) -> Result<WireTimestamp, WireError> {
    if options.use_iso_format {
        return Ok(WireTimestamp::Iso(
            ts.to_rfc3339_opts(SecondsFormat::Nanos, true),
        ));
    }
    options
        .precision
        .to_int(ts)
        .map(WireTimestamp::Int)
        .ok_or_else(|| {
            WireError::InvalidData(format!(
                "timestamp {} not representable in precision {}",
                ts, options.precision
            ))
        })
}

fn check_point(index: usize, point: &Point) -> Result<(), WireError> {
    if point.measurement.is_empty() {
        return Err(WireError::InvalidData(format!(
            "point {} has no measurement",
            index
        )));
    }
    if point.fields.is_empty() {
        return Err(WireError::InvalidData(format!(
            "point {} in {:?} has no fields",
            index, point.measurement
        )));
    }
    for (leaf, value) in &point.fields {
        if let Value::Float(v) = value {
            if !v.is_finite() {
                return Err(WireError::InvalidData(format!(
                    "field {:?} of point {} is {}",
                    leaf, index, v
                )));
            }
        }
    }
    Ok(())
}

/// Tags carrying the same value on every point.
fn shared_tags(points: &[Point]) -> TagSet {
    let Some((first, rest)) = points.split_first() else {
        return TagSet::new();
    };
    first
        .tags
        .iter()
        .filter(|(k, v)| rest.iter().all(|p| p.tags.get(*k) == Some(*v)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Render points as an InfluxDB JSON write body.
///
/// A timestamp shared by all points moves to the body, as do tags with the
/// same value on every point.
pub fn encode_write_body(points: &[Point], options: &WriteOptions) -> Result<WriteBody, WireError> {
    let Some(first) = points.first() else {
        return Err(WireError::EmptyInput);
    };
    for (index, point) in points.iter().enumerate() {
        check_point(index, point)?;
    }

    let shared_time = points.iter().all(|p| p.timestamp == first.timestamp);
    let body_tags = shared_tags(points);

    let timestamp = if shared_time {
        Some(wire_timestamp(first.timestamp, options)?)
    } else {
        None
    };
    let point_precision = (!shared_time && !options.use_iso_format).then_some(options.precision);

    let wire_points = points
        .iter()
        .map(|p| {
            let timestamp = if shared_time {
                None
            } else {
                Some(wire_timestamp(p.timestamp, options)?)
            };
            Ok(WirePoint {
                name: p.measurement.clone(),
                tags: p
                    .tags
                    .iter()
                    .filter(|(k, _)| !body_tags.contains_key(*k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                fields: p.fields.clone(),
                timestamp,
                precision: point_precision,
            })
        })
        .collect::<Result<Vec<_>, WireError>>()?;

    tracing::debug!(
        points = wire_points.len(),
        shared_time,
        shared_tags = body_tags.len(),
        "encoded write body"
    );

    Ok(WriteBody {
        database: options.database.clone(),
        retention_policy: options.retention_policy.clone(),
        precision: options.precision,
        timestamp,
        tags: body_tags,
        points: wire_points,
    })
}
