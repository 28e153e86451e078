//! Result assembler: points -> tabular batch (read path).
//!
//! Points are merged into rows keyed by timestamp (and, by default, tag set).
//! Fields become `measurement<sep>leaf` columns, tags become metadata
//! columns, and the frame's column set is the union over all points.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tf_codec::Classifier;
use tf_frame::{Frame, FrameBuilder, Timestamp, Value};

use crate::error::{Result, SchemaError};
use crate::point::{Point, TagSet};

/// How points are merged into rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One row per distinct (timestamp, tag set).
    #[default]
    TagSet,
    /// One row per timestamp; differing tags conflict.
    Timestamp,
}

impl std::fmt::Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupBy::TagSet => write!(f, "tag_set"),
            GroupBy::Timestamp => write!(f, "timestamp"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembleOptions {
    #[serde(default)]
    pub group_by: GroupBy,
}

/// Assembles points into frames.
#[derive(Debug, Clone)]
pub struct Assembler {
    classifier: Classifier,
    options: AssembleOptions,
}

impl Assembler {
    pub fn new(classifier: Classifier, options: AssembleOptions) -> Self {
        Assembler {
            classifier,
            options,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Start an incremental assembly.
    pub fn accumulator(&self) -> Accumulator<'_> {
        Accumulator {
            assembler: self,
            builder: FrameBuilder::new(),
            rows: HashMap::new(),
            field_columns: HashMap::new(),
            tag_columns: HashMap::new(),
            points: 0,
        }
    }

    /// Assemble every point into one frame sorted by timestamp.
    pub fn assemble<I>(&self, points: I) -> Result<Frame>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut acc = self.accumulator();
        for point in points {
            acc.push(point)?;
        }
        Ok(acc.finish())
    }
}

type RowKey = (Timestamp, Option<TagSet>);

/// Incremental frame assembly over a point stream.
#[derive(Debug)]
pub struct Accumulator<'a> {
    assembler: &'a Assembler,
    builder: FrameBuilder,
    rows: HashMap<RowKey, usize>,
    /// (measurement, leaf) -> column name.
    field_columns: HashMap<(String, String), String>,
    /// Tag key -> column name.
    tag_columns: HashMap<String, String>,
    points: usize,
}

impl Accumulator<'_> {
    /// Merge one point into its row.
    ///
    /// Fails with `InvalidName` when a field or tag of the point cannot be
    /// named as a column and with `SchemaError::Conflict` when the row already holds a
    /// different value for one of its columns.
    pub fn push(&mut self, point: Point) -> Result<()> {
        let Point {
            measurement,
            timestamp,
            tags,
            fields,
        } = point;

        let mut cells: Vec<(String, Value)> = Vec::with_capacity(tags.len() + fields.len());
        for (key, value) in tags.iter() {
            cells.push((self.tag_column(key)?, Value::Str(value.clone())));
        }
        for (leaf, value) in fields {
            if value.is_nan() {
                continue;
            }
            cells.push((self.field_column(&measurement, leaf)?, value));
        }

        let key = match self.assembler.options.group_by {
            GroupBy::TagSet => (timestamp, Some(tags)),
            GroupBy::Timestamp => (timestamp, None),
        };
        let row = match self.rows.get(&key) {
            Some(&row) => row,
            None => {
                let row = self.builder.push_row(timestamp);
                self.rows.insert(key, row);
                row
            }
        };

        for (column, incoming) in cells {
            let slot = self.builder.slot(row, &column);
            match slot.as_ref() {
                Some(existing) if *existing != incoming => {
                    return Err(SchemaError::Conflict {
                        timestamp,
                        column,
                        existing: existing.clone(),
                        incoming,
                    }
                    .into());
                }
                Some(_) => {}
                None => *slot = Some(incoming),
            }
        }

        self.points += 1;
        Ok(())
    }

    /// Number of rows created so far.
    pub fn num_rows(&self) -> usize {
        self.builder.num_rows()
    }

    /// Number of points merged so far.
    pub fn num_points(&self) -> usize {
        self.points
    }

    /// Finish assembly: rows sorted by timestamp, ties in arrival order.
    pub fn finish(self) -> Frame {
        let frame = self.builder.finish().sort_by_index();
        tracing::debug!(
            points = self.points,
            rows = frame.num_rows(),
            columns = frame.num_columns(),
            "assembled frame"
        );
        frame
    }

    fn tag_column(&mut self, key: &str) -> Result<String> {
        if let Some(column) = self.tag_columns.get(key) {
            return Ok(column.clone());
        }
        let column = self.assembler.classifier.tag_column(key)?;
        self.tag_columns.insert(key.to_string(), column.clone());
        Ok(column)
    }

    fn field_column(&mut self, measurement: &str, leaf: String) -> Result<String> {
        let key = (measurement.to_string(), leaf);
        if let Some(column) = self.field_columns.get(&key) {
            return Ok(column.clone());
        }
        let column = self.assembler.classifier.codec().encode(&key.0, &key.1)?;
        self.field_columns.insert(key, column.clone());
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::{TimeZone, Utc};
    use tf_codec::{InvalidNameError, MarkerSet};

    fn ts(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn assembler(group_by: GroupBy) -> Assembler {
        let classifier =
            Classifier::new(MarkerSet::default().with_tag("_tag_region", "region")).unwrap();
        Assembler::new(classifier, AssembleOptions { group_by })
    }

    #[test]
    fn test_end_to_end_example() {
        let points = vec![Point::new("activity", ts(0))
            .with_tag("region", "us")
            .with_field("calories", 250)
            .with_field("steps", 1000)];
        let frame = assembler(GroupBy::TagSet).assemble(points).unwrap();
        assert_eq!(frame.num_rows(), 1);
        assert_eq!(
            frame.column("_tag_region").unwrap().get(0),
            Some(&Value::from("us"))
        );
        assert_eq!(
            frame.column("activity.calories").unwrap().get(0),
            Some(&Value::Int(250))
        );
        assert_eq!(
            frame.column("activity.steps").unwrap().get(0),
            Some(&Value::Int(1000))
        );
    }

    #[test]
    fn test_merges_measurements_into_one_row() {
        let points = vec![
            Point::new("a", ts(0)).with_field("x", 1),
            Point::new("b", ts(0)).with_field("y", 2),
        ];
        let frame = assembler(GroupBy::TagSet).assemble(points).unwrap();
        assert_eq!(frame.num_rows(), 1);
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["a.x", "b.y"]);
    }

    #[test]
    fn test_distinct_tag_sets_get_distinct_rows() {
        let points = vec![
            Point::new("a", ts(0)).with_tag("region", "us").with_field("x", 1),
            Point::new("a", ts(0)).with_tag("region", "eu").with_field("x", 2),
        ];
        let frame = assembler(GroupBy::TagSet).assemble(points).unwrap();
        assert_eq!(frame.num_rows(), 2);
        assert_eq!(frame.index(), &[ts(0), ts(0)]);
        assert_eq!(
            frame.column("_tag_region").unwrap().values(),
            &[Some(Value::from("us")), Some(Value::from("eu"))]
        );
    }

    #[test]
    fn test_group_by_timestamp_conflicts_on_tags() {
        let points = vec![
            Point::new("a", ts(0)).with_tag("region", "us").with_field("x", 1),
            Point::new("b", ts(0)).with_tag("region", "eu").with_field("y", 2),
        ];
        let err = assembler(GroupBy::Timestamp).assemble(points).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::Conflict { ref column, .. }) if column == "_tag_region"
        ));
    }

    #[test]
    fn test_conflicting_field_values() {
        let points = vec![
            Point::new("a", ts(0)).with_field("x", 1),
            Point::new("a", ts(0)).with_field("x", 2),
        ];
        let err = assembler(GroupBy::TagSet).assemble(points).unwrap_err();
        assert_eq!(err.code(), 42);
    }

    #[test]
    fn test_equal_values_merge() {
        let points = vec![
            Point::new("a", ts(0)).with_field("x", 1),
            Point::new("a", ts(0)).with_field("x", 1).with_field("y", 2),
        ];
        let frame = assembler(GroupBy::TagSet).assemble(points).unwrap();
        assert_eq!(frame.num_rows(), 1);
        assert_eq!(frame.num_columns(), 2);
    }

    #[test]
    fn test_rows_sorted_and_columns_unioned() {
        let points = vec![
            Point::new("a", ts(10)).with_field("x", 1),
            Point::new("b", ts(5)).with_field("y", 2),
        ];
        let frame = assembler(GroupBy::TagSet).assemble(points).unwrap();
        assert_eq!(frame.index(), &[ts(5), ts(10)]);
        assert_eq!(frame.column("a.x").unwrap().values(), &[None, Some(Value::Int(1))]);
        assert_eq!(frame.column("b.y").unwrap().values(), &[Some(Value::Int(2)), None]);
    }

    #[test]
    fn test_bare_measurement_reads_back_bare() {
        let frame = assembler(GroupBy::TagSet)
            .assemble(vec![Point::new("", ts(0)).with_field("bpm", 60)])
            .unwrap();
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["bpm"]);
    }

    #[test]
    fn test_unnameable_leaf_is_rejected() {
        let err = assembler(GroupBy::TagSet)
            .assemble(vec![Point::new("a", ts(0)).with_field("x.y", 1)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
    }

    #[test]
    fn test_tag_sharing_another_tags_column_is_rejected() {
        // `tag_region` would land in `_tag_region`, which reads back as `region`.
        for other in ["us", "eu"] {
            let points = vec![Point::new("a", ts(0))
                .with_tag("region", "us")
                .with_tag("tag_region", other)
                .with_field("x", 1)];
            let err = assembler(GroupBy::TagSet).assemble(points).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidName(InvalidNameError::UnmappedTag { ref key, .. }) if key == "tag_region"
            ));
        }
    }

    #[test]
    fn test_tag_without_readable_column_is_rejected() {
        let assembler = Assembler::new(
            Classifier::new(MarkerSet::default()).unwrap(),
            AssembleOptions::default(),
        );
        let err = assembler
            .assemble(vec![Point::new("a", ts(0)).with_tag("host", "h1").with_field("x", 1)])
            .unwrap_err();
        assert_eq!(err.code(), 18);

        let untagged = assembler
            .assemble(vec![Point::new("a", ts(0)).with_field("x", 1)])
            .unwrap();
        assert_eq!(untagged.column_names().collect::<Vec<_>>(), vec!["a.x"]);
    }

    #[test]
    fn test_empty_input() {
        let frame = assembler(GroupBy::TagSet).assemble(Vec::new()).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.num_columns(), 0);
    }

    #[test]
    fn test_accumulator_counts() {
        let assembler = assembler(GroupBy::TagSet);
        let mut acc = assembler.accumulator();
        acc.push(Point::new("a", ts(0)).with_field("x", 1)).unwrap();
        acc.push(Point::new("a", ts(1)).with_field("x", 2)).unwrap();
        acc.push(Point::new("b", ts(1)).with_field("y", 3)).unwrap();
        assert_eq!(acc.num_points(), 3);
        assert_eq!(acc.num_rows(), 2);
        assert_eq!(acc.finish().num_columns(), 2);
    }
}
