//! Metadata classifier.
//!
//! Turns a column name into a [`ColumnClass`] once per batch so that the
//! write and read paths never re-parse names per row.

use std::collections::HashMap;

use crate::error::{InvalidNameError, Result};
use crate::marker::{MarkerSet, MetadataRole};
use crate::namespace::NamespaceCodec;

/// Classification of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnClass {
    /// Metadata that is never stored.
    Excluded,
    /// Metadata stored as the tag with this key.
    Tag(String),
    /// A measured value: `namespace` is the measurement, `leaf` the field.
    Field { namespace: String, leaf: String },
}

impl ColumnClass {
    pub fn is_field(&self) -> bool {
        matches!(self, ColumnClass::Field { .. })
    }
}

/// Classifies columns against an immutable, validated [`MarkerSet`].
#[derive(Debug, Clone)]
pub struct Classifier {
    codec: NamespaceCodec,
    markers: MarkerSet,
    /// Tag key -> explicit column, for the read path.
    tag_columns: HashMap<String, String>,
}

impl Classifier {
    /// Validate the marker set and build a classifier.
    ///
    /// Every configuration error surfaces here, before any batch is read.
    pub fn new(markers: MarkerSet) -> Result<Self> {
        let convention = markers.convention;
        convention.validate()?;

        if let Some(prefix) = &markers.tag_prefix {
            if !convention.is_metadata(prefix) {
                return Err(InvalidNameError::NotMetadata {
                    name: prefix.clone(),
                    marker: convention.marker,
                });
            }
            if prefix.len() == convention.marker.len_utf8() {
                return Err(InvalidNameError::Degenerate {
                    name: prefix.clone(),
                });
            }
        }

        let mut tag_columns: HashMap<String, String> = HashMap::new();
        for (column, role) in &markers.entries {
            if !convention.is_metadata(column) {
                return Err(InvalidNameError::NotMetadata {
                    name: column.clone(),
                    marker: convention.marker,
                });
            }
            if column.len() == convention.marker.len_utf8() {
                return Err(InvalidNameError::Degenerate {
                    name: column.clone(),
                });
            }
            if let MetadataRole::Tag { key } = role {
                if key.is_empty() {
                    return Err(InvalidNameError::Empty);
                }
                if let Some(first) = tag_columns.insert(key.clone(), column.clone()) {
                    return Err(InvalidNameError::DuplicateTagKey {
                        key: key.clone(),
                        first,
                        second: column.clone(),
                    });
                }
            }
        }

        Ok(Classifier {
            codec: NamespaceCodec::new(convention),
            markers,
            tag_columns,
        })
    }

    pub fn codec(&self) -> &NamespaceCodec {
        &self.codec
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Classify a single column name.
    pub fn classify(&self, column: &str) -> Result<ColumnClass> {
        let convention = self.codec.convention();
        if !convention.is_metadata(column) {
            let (namespace, leaf) = self.codec.decode(column)?;
            return Ok(ColumnClass::Field {
                namespace: namespace.to_string(),
                leaf: leaf.to_string(),
            });
        }

        if column.len() == convention.marker.len_utf8() {
            return Err(InvalidNameError::Degenerate {
                name: column.to_string(),
            });
        }

        match self.markers.role(column) {
            Some(MetadataRole::Excluded) => Ok(ColumnClass::Excluded),
            Some(MetadataRole::Tag { key }) => Ok(ColumnClass::Tag(key.clone())),
            None => match self
                .markers
                .tag_prefix
                .as_deref()
                .and_then(|prefix| column.strip_prefix(prefix))
            {
                Some("") => Err(InvalidNameError::Degenerate {
                    name: column.to_string(),
                }),
                Some(key) => Ok(ColumnClass::Tag(key.to_string())),
                None => Ok(ColumnClass::Excluded),
            },
        }
    }

    /// Classify every column of a batch, failing on the first bad name.
    pub fn classify_all<'a, I>(&self, columns: I) -> Result<Vec<ColumnClass>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        columns.into_iter().map(|c| self.classify(c)).collect()
    }

    /// Column name a tag is written back to on the read path.
    ///
    /// Explicit entries first, then the tag prefix, then the bare marker.
    /// The chosen column always classifies back as `Tag(key)`; a key with no
    /// such column is `UnmappedTag`.
    pub fn tag_column(&self, key: &str) -> Result<String> {
        if let Some(column) = self.tag_columns.get(key) {
            return Ok(column.clone());
        }
        let column = match &self.markers.tag_prefix {
            Some(prefix) => format!("{}{}", prefix, key),
            None => format!("{}{}", self.codec.convention().marker, key),
        };
        match self.classify(&column) {
            Ok(ColumnClass::Tag(found)) if found == key => Ok(column),
            _ => Err(InvalidNameError::UnmappedTag {
                key: key.to_string(),
                column,
            }),
        }
    }
}
