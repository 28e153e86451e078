//! Backend-storable points.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tf_frame::{Timestamp, Value};

/// Tag key -> tag value.
pub type TagSet = BTreeMap<String, String>;

/// Field leaf -> value. All leaves belong to the point's measurement.
pub type FieldSet = BTreeMap<String, Value>;

/// One (measurement, timestamp, tag-set, field-set) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub measurement: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: TagSet,
    pub fields: FieldSet,
}

impl Point {
    pub fn new(measurement: impl Into<String>, timestamp: Timestamp) -> Self {
        Point {
            measurement: measurement.into(),
            timestamp,
            tags: TagSet::new(),
            fields: FieldSet::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_field(mut self, leaf: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(leaf.into(), value.into());
        self
    }

    /// True when every filter pair is present with an equal value.
    pub fn matches_tags<'a, I>(&self, filters: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        filters
            .into_iter()
            .all(|(k, v)| self.tags.get(k).map(String::as_str) == Some(v))
    }
}
