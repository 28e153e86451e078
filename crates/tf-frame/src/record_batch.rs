//! Conversion between [`Frame`] and Arrow `RecordBatch`.
//!
//! The time index becomes a non-null `Timestamp(Nanosecond, "UTC")` column;
//! every frame column becomes a nullable Arrow column whose type is inferred
//! from its values:
//! - all integers -> `Int64`, all unsigned -> `UInt64`, all floats -> `Float64`
//! - any mix of numeric kinds -> `Float64`
//! - booleans -> `Boolean`, strings -> `Utf8`
//! - all-null -> `Utf8`

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray,
    TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
    TimestampSecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::DateTime;

use crate::error::{FrameError, Result};
use crate::frame::{Column, Frame, Timestamp};
use crate::value::{Value, ValueKind};

/// Default name of the time column.
pub const DEFAULT_TIME_COLUMN: &str = "time";

/// Helper to create the time field (nanoseconds UTC).
fn timestamp_field(name: &str) -> Field {
    Field::new(
        name,
        DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
        false,
    )
}

/// Infer the Arrow type of a column from its values.
fn column_type(column: &Column) -> Result<DataType> {
    let mut kind: Option<ValueKind> = None;
    for value in column.values().iter().flatten() {
        let next = value.kind();
        kind = Some(match kind {
            None => next,
            Some(k) if k == next => k,
            Some(k) if k.is_numeric() && next.is_numeric() => ValueKind::Float,
            Some(k) => {
                return Err(FrameError::MixedTypes {
                    column: column.name().to_string(),
                    first: k,
                    second: next,
                })
            }
        });
    }

    Ok(match kind {
        Some(ValueKind::Int) => DataType::Int64,
        Some(ValueKind::UInt) => DataType::UInt64,
        Some(ValueKind::Float) => DataType::Float64,
        Some(ValueKind::Bool) => DataType::Boolean,
        Some(ValueKind::Str) | None => DataType::Utf8,
    })
}

fn column_array(column: &Column, data_type: &DataType) -> ArrayRef {
    let values = column.values();
    match data_type {
        DataType::Int64 => Arc::new(Int64Array::from(
            values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_i64))
                .collect::<Vec<_>>(),
        )),
        DataType::UInt64 => Arc::new(UInt64Array::from(
            values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_u64))
                .collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_f64))
                .collect::<Vec<_>>(),
        )),
        DataType::Boolean => Arc::new(BooleanArray::from(
            values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_bool))
                .collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_str))
                .collect::<Vec<_>>(),
        )),
    }
}

/// Arrow schema a frame converts to.
pub fn frame_schema(frame: &Frame, time_column: &str) -> Result<Schema> {
    let mut fields = vec![timestamp_field(time_column)];
    for column in frame.columns() {
        if column.name() == time_column {
            return Err(FrameError::DuplicateColumn(time_column.to_string()));
        }
        fields.push(Field::new(column.name(), column_type(column)?, true));
    }
    Ok(Schema::new(fields))
}

/// Convert a frame to a record batch.
pub fn to_record_batch(frame: &Frame, time_column: &str) -> Result<RecordBatch> {
    let schema = frame_schema(frame, time_column)?;

    let nanos = frame
        .index()
        .iter()
        .map(|ts| {
            ts.timestamp_nanos_opt()
                .ok_or_else(|| FrameError::TimestampOutOfRange(ts.to_rfc3339()))
        })
        .collect::<Result<Vec<i64>>>()?;

    let mut arrays: Vec<ArrayRef> =
        vec![Arc::new(TimestampNanosecondArray::from(nanos).with_timezone("UTC"))];
    for (column, field) in frame.columns().iter().zip(schema.fields().iter().skip(1)) {
        arrays.push(column_array(column, field.data_type()));
    }

    Ok(RecordBatch::try_new(Arc::new(schema), arrays)?)
}

fn timestamps(array: &dyn Array, name: &str) -> Result<Vec<Timestamp>> {
    fn collect<F>(len: usize, is_null: impl Fn(usize) -> bool, convert: F) -> Result<Vec<Timestamp>>
    where
        F: Fn(usize) -> Option<Timestamp>,
    {
        (0..len)
            .map(|row| {
                if is_null(row) {
                    return Err(FrameError::NullTimestamp { row });
                }
                convert(row).ok_or_else(|| FrameError::TimestampOutOfRange(format!("row {}", row)))
            })
            .collect()
    }

    let unsupported = || FrameError::UnsupportedType {
        column: name.to_string(),
        data_type: array.data_type().to_string(),
    };
    let len = array.len();
    let is_null = |row| array.is_null(row);

    match array.data_type() {
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            let a = array
                .as_any()
                .downcast_ref::<TimestampNanosecondArray>()
                .ok_or_else(unsupported)?;
            collect(len, is_null, |row| Some(DateTime::from_timestamp_nanos(a.value(row))))
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let a = array
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .ok_or_else(unsupported)?;
            collect(len, is_null, |row| DateTime::from_timestamp_micros(a.value(row)))
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let a = array
                .as_any()
                .downcast_ref::<TimestampMillisecondArray>()
                .ok_or_else(unsupported)?;
            collect(len, is_null, |row| DateTime::from_timestamp_millis(a.value(row)))
        }
        DataType::Timestamp(TimeUnit::Second, _) => {
            let a = array
                .as_any()
                .downcast_ref::<TimestampSecondArray>()
                .ok_or_else(unsupported)?;
            collect(len, is_null, |row| DateTime::from_timestamp(a.value(row), 0))
        }
        DataType::Int64 => {
            let a = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(unsupported)?;
            collect(len, is_null, |row| Some(DateTime::from_timestamp_nanos(a.value(row))))
        }
        _ => Err(unsupported()),
    }
}

/// Read one Arrow column into frame values, normalising integer and float
/// widths through Arrow's cast kernel.
fn column_values(array: &dyn Array, name: &str) -> Result<Vec<Option<Value>>> {
    let unsupported = || FrameError::UnsupportedType {
        column: name.to_string(),
        data_type: array.data_type().to_string(),
    };

    let target = match array.data_type() {
        DataType::Null => return Ok(vec![None; array.len()]),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => DataType::Int64,
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            DataType::UInt64
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => DataType::Float64,
        DataType::Boolean => DataType::Boolean,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => DataType::Utf8,
        _ => return Err(unsupported()),
    };
    let cast = arrow::compute::cast(array, &target)?;
    let any = cast.as_any();

    let values = match target {
        DataType::Int64 => {
            let a = any.downcast_ref::<Int64Array>().ok_or_else(unsupported)?;
            a.iter().map(|v| v.map(Value::Int)).collect()
        }
        DataType::UInt64 => {
            let a = any.downcast_ref::<UInt64Array>().ok_or_else(unsupported)?;
            a.iter().map(|v| v.map(Value::UInt)).collect()
        }
        DataType::Float64 => {
            let a = any.downcast_ref::<Float64Array>().ok_or_else(unsupported)?;
            a.iter().map(|v| v.map(Value::Float)).collect()
        }
        DataType::Boolean => {
            let a = any.downcast_ref::<BooleanArray>().ok_or_else(unsupported)?;
            a.iter().map(|v| v.map(Value::Bool)).collect()
        }
        _ => {
            let a = any.downcast_ref::<StringArray>().ok_or_else(unsupported)?;
            a.iter().map(|v| v.map(Value::from)).collect()
        }
    };
    Ok(values)
}

/// Convert a record batch back to a frame.
///
/// `time_column` may be any Arrow timestamp unit, or `Int64` nanoseconds.
pub fn from_record_batch(batch: &RecordBatch, time_column: &str) -> Result<Frame> {
    let schema = batch.schema();
    let time_idx = schema
        .index_of(time_column)
        .map_err(|_| FrameError::MissingTimeColumn(time_column.to_string()))?;

    let index = timestamps(batch.column(time_idx).as_ref(), time_column)?;
    let mut frame = Frame::new(index);
    for (idx, field) in schema.fields().iter().enumerate() {
        if idx == time_idx {
            continue;
        }
        let values = column_values(batch.column(idx).as_ref(), field.name())?;
        frame.push_column(Column::new(field.name().as_str(), values))?;
    }
    Ok(frame)
}

/// Render a frame as an ASCII table.
pub fn pretty_format(frame: &Frame) -> Result<String> {
    let batch = to_record_batch(frame, DEFAULT_TIME_COLUMN)?;
    Ok(arrow::util::pretty::pretty_format_batches(&[batch])?.to_string())
}
