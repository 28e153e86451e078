//! Frames exchanged with Arrow batches produced elsewhere.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float32Array, Int32Array, LargeStringArray, RecordBatch,
    TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::{TimeZone, Utc};
use tf_frame::{
    from_record_batch, pretty_format, to_record_batch, Frame, FrameBuilder, FrameError, Timestamp,
    Value, DEFAULT_TIME_COLUMN,
};

fn ts(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Batch shaped like a dataframe library export: narrow numeric types,
/// large strings, millisecond timestamps, time column not first.
fn foreign_batch() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("activity.steps", DataType::Int32, true),
        Field::new(
            "ts",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new("bio.temp", DataType::Float32, true),
        Field::new("_tag_region", DataType::LargeUtf8, true),
        Field::new("device.charging", DataType::Boolean, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(vec![Some(10), None, Some(30)])),
        Arc::new(TimestampMillisecondArray::from(vec![0, 1_000, 2_500])),
        Arc::new(Float32Array::from(vec![Some(36.5), Some(37.0), None])),
        Arc::new(LargeStringArray::from(vec![Some("us"), None, Some("eu")])),
        Arc::new(BooleanArray::from(vec![None, Some(true), Some(false)])),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).unwrap()
}

#[test]
fn test_foreign_batch_is_normalised() {
    let frame = from_record_batch(&foreign_batch(), "ts").unwrap();
    assert_eq!(frame.num_rows(), 3);
    assert_eq!(
        frame.column_names().collect::<Vec<_>>(),
        vec!["activity.steps", "bio.temp", "_tag_region", "device.charging"]
    );
    assert_eq!(frame.index()[2], Utc.timestamp_millis_opt(2_500).unwrap());
    assert_eq!(
        frame.column("activity.steps").unwrap().values(),
        &[Some(Value::Int(10)), None, Some(Value::Int(30))]
    );
    assert_eq!(
        frame.column("bio.temp").unwrap().get(0),
        Some(&Value::Float(36.5))
    );
    assert_eq!(
        frame.column("_tag_region").unwrap().get(2),
        Some(&Value::from("eu"))
    );
    assert_eq!(
        frame.column("device.charging").unwrap().get(1),
        Some(&Value::Bool(true))
    );
}

#[test]
fn test_missing_time_column() {
    let err = from_record_batch(&foreign_batch(), DEFAULT_TIME_COLUMN).unwrap_err();
    assert!(matches!(err, FrameError::MissingTimeColumn(ref c) if c == "time"));
    assert_eq!(err.code(), 34);
}

#[test]
fn test_builder_output_converts() {
    let mut builder = FrameBuilder::new();
    let r0 = builder.push_row(ts(10));
    *builder.slot(r0, "a.x") = Some(Value::Int(1));
    let r1 = builder.push_row(ts(5));
    *builder.slot(r1, "b.y") = Some(Value::from("late"));
    let frame = builder.finish().sort_by_index();

    let batch = to_record_batch(&frame, DEFAULT_TIME_COLUMN).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.schema().field(1).data_type(), &DataType::Int64);
    assert_eq!(batch.schema().field(2).data_type(), &DataType::Utf8);

    let back = from_record_batch(&batch, DEFAULT_TIME_COLUMN).unwrap();
    assert_eq!(back, frame);
    assert_eq!(back.index(), &[ts(5), ts(10)]);
}

#[test]
fn test_mixed_column_is_rejected() {
    let frame = Frame::new(vec![ts(0), ts(1)])
        .with_column("a.x", vec![Some(Value::Int(1)), Some(Value::from("one"))])
        .unwrap();
    let err = to_record_batch(&frame, DEFAULT_TIME_COLUMN).unwrap_err();
    assert_eq!(err.code(), 32);
}

#[test]
fn test_pretty_format_lists_columns() {
    let frame = Frame::new(vec![ts(0)])
        .with_values("activity.steps", vec![Some(1000)])
        .unwrap();
    let table = pretty_format(&frame).unwrap();
    assert!(table.contains("activity.steps"));
    assert!(table.contains("1000"));
    assert!(table.contains("time"));
}
