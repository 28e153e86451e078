//! Row projector: tabular batch -> points (write path).
//!
//! Columns are classified once per batch into a [`ColumnPlan`]; every
//! naming or collision error surfaces from [`Projector::project`] before any
//! row is read. The resulting [`Projection`] is restartable and yields points
//! lazily: one per (row, measurement) that has at least one present field.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tf_codec::{Classifier, ColumnClass};
use tf_frame::{Frame, Value};

use crate::error::{Result, SchemaError};
use crate::point::{FieldSet, Point, TagSet};

/// Write-path options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOptions {
    /// Frame-wide tags added to every point; they win over tag columns.
    #[serde(default)]
    pub labels: TagSet,

    /// Data columns skipped entirely.
    #[serde(default)]
    pub ignore: BTreeSet<String>,

    /// Treat numeric zero as a missing value.
    #[serde(default)]
    pub zero_null: bool,

    /// Measurement for bare columns. Unset keeps them in the empty
    /// namespace so they read back under their original name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_measurement: Option<String>,
}

/// Fields of one measurement: leaf and source column position.
#[derive(Debug, Clone)]
struct MeasurementPlan {
    name: String,
    fields: Vec<(String, usize)>,
}

/// Per-batch classification result, reused for every row.
#[derive(Debug, Clone, Default)]
struct ColumnPlan {
    tags: Vec<(String, usize)>,
    /// In first-seen column order.
    measurements: Vec<MeasurementPlan>,
}

/// Projects frames into points.
#[derive(Debug, Clone)]
pub struct Projector {
    classifier: Classifier,
    options: ProjectOptions,
}

impl Projector {
    pub fn new(classifier: Classifier, options: ProjectOptions) -> Self {
        Projector {
            classifier,
            options,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn options(&self) -> &ProjectOptions {
        &self.options
    }

    /// Plan the projection of `frame`.
    ///
    /// Fails with `InvalidName` for a malformed column and with
    /// `SchemaError` when two columns map to the same field or tag.
    pub fn project<'f>(&'f self, frame: &'f Frame) -> Result<Projection<'f>> {
        let plan = self.plan(frame)?;
        tracing::debug!(
            columns = frame.num_columns(),
            rows = frame.num_rows(),
            tags = plan.tags.len(),
            measurements = plan.measurements.len(),
            "planned projection"
        );
        Ok(Projection {
            frame,
            plan,
            options: &self.options,
        })
    }

    /// Project and collect every point.
    pub fn project_all(&self, frame: &Frame) -> Result<Vec<Point>> {
        Ok(self.project(frame)?.iter().collect())
    }

    fn plan(&self, frame: &Frame) -> Result<ColumnPlan> {
        let mut plan = ColumnPlan::default();
        let mut tag_sources: HashMap<String, usize> = HashMap::new();
        let mut field_sources: HashMap<(String, String), usize> = HashMap::new();
        let mut measurement_pos: HashMap<String, usize> = HashMap::new();

        for (idx, column) in frame.columns().iter().enumerate() {
            let name = column.name();
            if self.options.ignore.contains(name) {
                continue;
            }

            match self.classifier.classify(name)? {
                ColumnClass::Excluded => {}
                ColumnClass::Tag(key) => {
                    if self.options.labels.contains_key(&key) {
                        continue;
                    }
                    if let Some(&first) = tag_sources.get(&key) {
                        return Err(SchemaError::DuplicateTag {
                            key,
                            first: frame.columns()[first].name().to_string(),
                            second: name.to_string(),
                        }
                        .into());
                    }
                    tag_sources.insert(key.clone(), idx);
                    plan.tags.push((key, idx));
                }
                ColumnClass::Field { namespace, leaf } => {
                    let measurement = match (&self.options.default_measurement, namespace.is_empty())
                    {
                        (Some(default), true) => default.clone(),
                        _ => namespace,
                    };

                    let source_key = (measurement.clone(), leaf.clone());
                    if let Some(&first) = field_sources.get(&source_key) {
                        return Err(SchemaError::DuplicateField {
                            namespace: measurement,
                            leaf,
                            first: frame.columns()[first].name().to_string(),
                            second: name.to_string(),
                        }
                        .into());
                    }
                    field_sources.insert(source_key, idx);

                    let pos = *measurement_pos
                        .entry(measurement.clone())
                        .or_insert_with(|| {
                            plan.measurements.push(MeasurementPlan {
                                name: measurement,
                                fields: Vec::new(),
                            });
                            plan.measurements.len() - 1
                        });
                    plan.measurements[pos].fields.push((leaf, idx));
                }
            }
        }

        Ok(plan)
    }
}

/// A planned, restartable projection of one frame.
#[derive(Debug, Clone)]
pub struct Projection<'f> {
    frame: &'f Frame,
    plan: ColumnPlan,
    options: &'f ProjectOptions,
}

impl<'f> Projection<'f> {
    /// A fresh lazy pass over the frame's rows.
    pub fn iter(&self) -> Points<'_> {
        Points {
            frame: self.frame,
            plan: &self.plan,
            options: self.options,
            row: 0,
            measurement: 0,
            row_tags: TagSet::new(),
        }
    }

    /// Measurements this projection can emit, in first-seen order.
    pub fn measurements(&self) -> impl Iterator<Item = &str> {
        self.plan.measurements.iter().map(|m| m.name.as_str())
    }

    /// Tag keys taken from columns (labels not included).
    pub fn tag_keys(&self) -> impl Iterator<Item = &str> {
        self.plan.tags.iter().map(|(k, _)| k.as_str())
    }
}

impl<'a, 'f> IntoIterator for &'a Projection<'f> {
    type Item = Point;
    type IntoIter = Points<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over the points of a [`Projection`].
#[derive(Debug)]
pub struct Points<'a> {
    frame: &'a Frame,
    plan: &'a ColumnPlan,
    options: &'a ProjectOptions,
    row: usize,
    measurement: usize,
    row_tags: TagSet,
}

impl Points<'_> {
    fn is_missing(&self, value: &Value) -> bool {
        value.is_nan() || (self.options.zero_null && value.is_zero())
    }

    fn tags_for_row(&self, row: usize) -> TagSet {
        let mut tags: TagSet = self
            .plan
            .tags
            .iter()
            .filter_map(|(key, idx)| {
                self.frame
                    .value(row, *idx)
                    .and_then(Value::to_tag_string)
                    .map(|v| (key.clone(), v))
            })
            .collect();
        tags.extend(
            self.options
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        tags
    }
}

impl Iterator for Points<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while self.row < self.frame.num_rows() {
            let row = self.row;
            if self.measurement == 0 {
                self.row_tags = self.tags_for_row(row);
            }

            while let Some(m) = self.plan.measurements.get(self.measurement) {
                self.measurement += 1;
                let fields: FieldSet = m
                    .fields
                    .iter()
                    .filter_map(|(leaf, idx)| {
                        self.frame
                            .value(row, *idx)
                            .filter(|v| !self.is_missing(v))
                            .map(|v| (leaf.clone(), v.clone()))
                    })
                    .collect();
                if !fields.is_empty() {
                    return Some(Point {
                        measurement: m.name.clone(),
                        timestamp: self.frame.index()[row],
                        tags: self.row_tags.clone(),
                        fields,
                    });
                }
            }

            self.row += 1;
            self.measurement = 0;
        }
        None
    }
}
