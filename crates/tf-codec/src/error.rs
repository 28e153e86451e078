//! Error types for column naming.

use thiserror::Error;

/// Result type for naming operations.
pub type Result<T> = std::result::Result<T, InvalidNameError>;

/// A column name, namespace, leaf or marker-set entry that cannot be
/// mapped unambiguously.
///
/// These are configuration-class failures: they are raised when a codec or
/// classifier is built, or once per column when a batch is planned, never
/// halfway through a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameError {
    /// Column name or leaf is empty.
    #[error("empty name")]
    Empty,

    /// Leaf contains the namespace separator.
    #[error("leaf {leaf:?} contains the namespace separator {separator:?}")]
    SeparatorInLeaf { leaf: String, separator: char },

    /// A namespace segment is empty (leading, trailing or doubled separator).
    #[error("name {name:?} has an empty namespace segment")]
    EmptySegment { name: String },

    /// A data name would start with the metadata marker.
    #[error("name {name:?} starts with the metadata marker {marker:?}")]
    LeadingMarker { name: String, marker: char },

    /// A metadata name has nothing after the marker.
    #[error("metadata name {name:?} is empty after the marker")]
    Degenerate { name: String },

    /// A marker-set entry does not start with the marker.
    #[error("metadata entry {name:?} does not start with the marker {marker:?}")]
    NotMetadata { name: String, marker: char },

    /// Two marker-set entries map to the same tag key.
    #[error("tag key {key:?} is mapped by both {first:?} and {second:?}")]
    DuplicateTagKey {
        key: String,
        first: String,
        second: String,
    },

    /// Marker and separator are unusable together.
    #[error("invalid naming convention: {0}")]
    Convention(String),

    /// No metadata column reads back as the tag `key`.
    #[error("tag key {key:?} has no column that classifies back to it (tried {column:?})")]
    UnmappedTag { key: String, column: String },
}

impl InvalidNameError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            InvalidNameError::Empty => 10,
            InvalidNameError::SeparatorInLeaf { .. } => 11,
            InvalidNameError::EmptySegment { .. } => 12,
            InvalidNameError::LeadingMarker { .. } => 13,
            InvalidNameError::Degenerate { .. } => 14,
            InvalidNameError::NotMetadata { .. } => 15,
            InvalidNameError::DuplicateTagKey { .. } => 16,
            InvalidNameError::Convention(_) => 17,
            InvalidNameError::UnmappedTag { .. } => 18,
        }
    }
}
