//! Metadata marker set: which metadata columns become tags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::convention::NamingConvention;

/// What happens to a metadata column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role")]
pub enum MetadataRole {
    /// Never leaves memory.
    Excluded,
    /// Persisted as a tag named `key` on every point derived from the row.
    Tag { key: String },
}

/// Configuration of recognized metadata columns.
///
/// Any column starting with the marker and not listed here (and not matching
/// `tag_prefix`) is excluded. Explicit entries win over the prefix rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSet {
    #[serde(default)]
    pub convention: NamingConvention,

    /// Columns starting with this prefix are tags named by the remainder,
    /// e.g. `_tag_region` -> `region` for prefix `_tag_`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,

    /// Explicit roles by full column name.
    #[serde(default)]
    pub entries: BTreeMap<String, MetadataRole>,
}

impl MarkerSet {
    /// Empty marker set: every metadata column is excluded.
    pub fn new(convention: NamingConvention) -> Self {
        MarkerSet {
            convention,
            tag_prefix: None,
            entries: BTreeMap::new(),
        }
    }

    /// Map `column` to the tag `key`.
    pub fn with_tag(mut self, column: impl Into<String>, key: impl Into<String>) -> Self {
        self.entries
            .insert(column.into(), MetadataRole::Tag { key: key.into() });
        self
    }

    /// Map `column` to a tag named after the column without its marker.
    pub fn with_tag_column(self, column: impl Into<String>) -> Self {
        let column = column.into();
        let key = column
            .strip_prefix(self.convention.marker)
            .unwrap_or(&column)
            .to_string();
        self.with_tag(column, key)
    }

    /// Explicitly exclude `column`, overriding the tag prefix.
    pub fn with_excluded(mut self, column: impl Into<String>) -> Self {
        self.entries.insert(column.into(), MetadataRole::Excluded);
        self
    }

    /// Promote every column starting with `prefix` to a tag.
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = Some(prefix.into());
        self
    }

    /// Explicit role for `column`, if any.
    pub fn role(&self, column: &str) -> Option<&MetadataRole> {
        self.entries.get(column)
    }
}
