//! Frame <-> InfluxDB JSON through the projector and assembler.

use chrono::{TimeZone, Utc};
use serde_json::json;
use tf_codec::{Classifier, MarkerSet};
use tf_core::influx::{decode_chunked_response, decode_query_response, encode_write_body};
use tf_core::{
    AssembleOptions, Assembler, Error, Precision, ProjectOptions, Projector, WireError,
    WriteOptions,
};
use tf_frame::{Frame, Timestamp, Value};

fn ts(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn classifier() -> Classifier {
    Classifier::new(MarkerSet::default().with_tag_prefix("_tag_")).unwrap()
}

#[test]
fn test_frame_to_write_body() {
    let mut options = ProjectOptions {
        zero_null: true,
        ..Default::default()
    };
    options.labels.insert("user_id".into(), "42".into());
    let projector = Projector::new(classifier(), options);

    let frame = Frame::new(vec![ts(1), ts(2)])
        .with_values("_tag_device", vec![Some("watch"), Some("watch")])
        .unwrap()
        .with_values("activity.steps", vec![Some(0), Some(12)])
        .unwrap()
        .with_values("bio.bpm", vec![Some(61.5), None])
        .unwrap();

    let points = projector.project_all(&frame).unwrap();
    let body = encode_write_body(
        &points,
        &WriteOptions::default()
            .with_precision(Precision::S)
            .with_database("sensors"),
    )
    .unwrap();

    assert_eq!(
        body.to_value().unwrap(),
        json!({
            "database": "sensors",
            "precision": "s",
            "tags": {"device": "watch", "user_id": "42"},
            "points": [
                {"name": "bio", "fields": {"bpm": 61.5}, "timestamp": 1, "precision": "s"},
                {"name": "activity", "fields": {"steps": 12}, "timestamp": 2, "precision": "s"}
            ]
        })
    );
}

#[test]
fn test_query_response_to_frame() {
    let text = r#"{"results": [
        {"statement_id": 0, "series": [
            {"name": "activity", "tags": {"device": "watch"},
             "columns": ["time", "steps"], "values": [[0, 1000], [60000, 1200]]},
            {"name": "bio", "tags": {"device": "watch"},
             "columns": ["time", "bpm"], "values": [[0, 61.5]]}
        ]}
    ]}"#;
    let points = decode_query_response(text, Precision::Ms).unwrap();
    let frame = Assembler::new(classifier(), AssembleOptions::default())
        .assemble(points)
        .unwrap();

    assert_eq!(frame.index(), &[ts(0), ts(60)]);
    assert_eq!(
        frame.column_names().collect::<Vec<_>>(),
        vec!["_tag_device", "activity.steps", "bio.bpm"]
    );
    assert_eq!(
        frame.column("bio.bpm").unwrap().values(),
        &[Some(Value::Float(61.5)), None]
    );
}

#[test]
fn test_chunked_response_to_frame() {
    let text = concat!(
        r#"{"results":[{"series":[{"name":"a","columns":["time","x"],"values":[["1970-01-01T00:00:01Z",1]]}],"partial":true}]}"#,
        r#"{"results":[{"series":[{"name":"a","columns":["time","x"],"values":[["1970-01-01T00:00:00Z",0]]}]}]}"#,
    );
    let points = decode_chunked_response(text, Precision::Ms).unwrap();
    let frame = Assembler::new(classifier(), AssembleOptions::default())
        .assemble(points)
        .unwrap();
    assert_eq!(frame.index(), &[ts(0), ts(1)]);
    assert_eq!(
        frame.column("a.x").unwrap().values(),
        &[Some(Value::Int(0)), Some(Value::Int(1))]
    );
}

#[test]
fn test_measurement_not_found_converts() {
    let text = r#"{"results": [{"error": "Measurement Not Found"}]}"#;
    let err: Error = decode_query_response(text, Precision::Ms).unwrap_err().into();
    assert!(matches!(
        err,
        Error::Wire(WireError::MeasurementNotFound { chunk: 0, .. })
    ));
    assert_eq!(err.code(), 63);
}
