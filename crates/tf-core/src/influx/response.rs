//! Query response decoding.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value as Json;
use tf_frame::{Timestamp, Value};

use super::{Precision, WireError};
use crate::point::Point;

const TIME_COLUMN: &str = "time";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Response {
    Results { results: Vec<Chunk> },
    Failed { error: String },
    Chunks(Vec<Chunk>),
}

#[derive(Debug, Default, Deserialize)]
struct Chunk {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    series: Option<Vec<Series>>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tags: Option<BTreeMap<String, Option<String>>>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Option<Vec<Vec<Json>>>,
}

/// Decode a `/query` response body.
///
/// Accepts `{"results": [...]}`, a top-level `{"error": ...}` or a bare
/// array of result chunks. Blank input decodes to no points.
pub fn decode_query_response(text: &str, precision: Precision) -> Result<Vec<Point>, WireError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let response: Response = serde_json::from_str(text)?;
    let mut points = Vec::new();
    decode_response(response, 0, precision, &mut points)?;
    Ok(points)
}

/// Decode a `chunked=true` response: concatenated JSON documents.
///
/// Chunk numbers in errors count across documents.
pub fn decode_chunked_response(text: &str, precision: Precision) -> Result<Vec<Point>, WireError> {
    let mut points = Vec::new();
    let mut chunk = 0;
    for response in serde_json::Deserializer::from_str(text).into_iter::<Response>() {
        chunk += decode_response(response?, chunk, precision, &mut points)?;
    }
    Ok(points)
}

/// Returns the number of chunks consumed.
fn decode_response(
    response: Response,
    first_chunk: usize,
    precision: Precision,
    out: &mut Vec<Point>,
) -> Result<usize, WireError> {
    let chunks = match response {
        Response::Results { results } => results,
        Response::Chunks(chunks) => chunks,
        Response::Failed { error } => {
            return Err(chunk_error(first_chunk, error));
        }
    };
    let count = chunks.len();
    for (offset, chunk) in chunks.into_iter().enumerate() {
        let index = first_chunk + offset;
        if let Some(error) = chunk.error {
            return Err(chunk_error(index, error));
        }
        for series in chunk.series.into_iter().flatten() {
            decode_series(series, precision, out)?;
        }
    }
    Ok(count)
}

fn chunk_error(chunk: usize, message: String) -> WireError {
    let lower = message.to_lowercase();
    if lower.contains("measurement") && lower.contains("not found") {
        WireError::MeasurementNotFound { chunk, message }
    } else {
        WireError::Query { chunk, message }
    }
}

fn decode_series(series: Series, precision: Precision, out: &mut Vec<Point>) -> Result<(), WireError> {
    let name = series.name.unwrap_or_default();
    let rows = match series.values {
        Some(rows) if !rows.is_empty() && !series.columns.is_empty() => rows,
        _ => return Ok(()),
    };
    let time_idx = series
        .columns
        .iter()
        .position(|c| c == TIME_COLUMN)
        .ok_or_else(|| WireError::InvalidData(format!("series {:?} has no time column", name)))?;
    let tags: BTreeMap<String, String> = series
        .tags
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect();

    for row in rows {
        if row.len() != series.columns.len() {
            return Err(WireError::InvalidData(format!(
                "series {:?}: row has {} values for {} columns",
                name,
                row.len(),
                series.columns.len()
            )));
        }

        let timestamp = decode_time(&row[time_idx], precision)?;
        let mut point = Point::new(name.clone(), timestamp);
        point.tags = tags.clone();
        for (column, value) in series.columns.iter().zip(row) {
            if column == TIME_COLUMN {
                continue;
            }
            if let Some(value) = decode_value(column, value)? {
                point.fields.insert(column.clone(), value);
            }
        }
        if !point.fields.is_empty() {
            out.push(point);
        }
    }
    Ok(())
}

fn decode_time(value: &Json, precision: Precision) -> Result<Timestamp, WireError> {
    match value {
        Json::String(s) => chrono::DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| WireError::InvalidData(format!("time {:?}: {}", s, e))),
        Json::Number(n) => n
            .as_i64()
            .and_then(|v| precision.from_int(v))
            .ok_or_else(|| WireError::InvalidData(format!("time {} out of range", n))),
        other => Err(WireError::InvalidData(format!("unsupported time value {}", other))),
    }
}

fn decode_value(column: &str, value: Json) -> Result<Option<Value>, WireError> {
    Ok(match value {
        Json::Null => None,
        Json::Bool(b) => Some(Value::Bool(b)),
        Json::String(s) => Some(Value::Str(s)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Value::Int(i))
            } else if let Some(u) = n.as_u64() {
                Some(Value::UInt(u))
            } else {
                n.as_f64().map(Value::Float)
            }
        }
        Json::Array(_) | Json::Object(_) => {
            return Err(WireError::InvalidData(format!(
                "column {:?} holds a nested value",
                column
            )))
        }
    })
}
