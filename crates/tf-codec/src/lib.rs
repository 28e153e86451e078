//! Column naming for tsframe.
//!
//! This crate decides, for every column of a tabular batch, whether it is
//! excluded metadata, a tag, or a namespaced field, and converts between
//! namespaced column names and `(measurement, field)` pairs.
//!
//! # Conventions
//!
//! - A column starting with the metadata marker (default `_`) is metadata.
//! - A data column `<namespace>.<leaf>` is split at the **last** separator
//!   (default `.`): `a.b.c` is namespace `a.b`, leaf `c`.
//! - A data column without a separator is bare (empty namespace).
//!
//! # Example
//!
//! ```
//! use tf_codec::{Classifier, ColumnClass, MarkerSet};
//!
//! let classifier = Classifier::new(
//!     MarkerSet::default().with_tag("_tag_region", "region"),
//! ).unwrap();
//!
//! assert_eq!(classifier.classify("_pk").unwrap(), ColumnClass::Excluded);
//! assert_eq!(
//!     classifier.classify("_tag_region").unwrap(),
//!     ColumnClass::Tag("region".into()),
//! );
//! assert_eq!(
//!     classifier.classify("activity.steps").unwrap(),
//!     ColumnClass::Field { namespace: "activity".into(), leaf: "steps".into() },
//! );
//! ```

pub mod classify;
pub mod convention;
pub mod error;
pub mod marker;
pub mod namespace;

pub use classify::{Classifier, ColumnClass};
pub use convention::{NamingConvention, DEFAULT_MARKER, DEFAULT_SEPARATOR};
pub use error::{InvalidNameError, Result};
pub use marker::{MarkerSet, MetadataRole};
pub use namespace::NamespaceCodec;
