//! Translation between time-indexed frames and time-series points.
//!
//! The write path classifies each column of a [`Frame`] once, then lazily
//! projects rows into [`Point`]s grouped by measurement. The read path merges
//! points from a [`Backend`] back into a frame with the original column names.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tf_codec::{Classifier, MarkerSet};
//! use tf_core::{Assembler, AssembleOptions, Bridge, MemoryBackend, Projector, ProjectOptions, TimeRange};
//! use tf_frame::Frame;
//!
//! let classifier = Classifier::new(MarkerSet::default().with_tag("_tag_region", "region")).unwrap();
//! let mut bridge = Bridge::new(
//!     Projector::new(classifier.clone(), ProjectOptions::default()),
//!     Assembler::new(classifier, AssembleOptions::default()),
//!     MemoryBackend::new(),
//! );
//!
//! let frame = Frame::new(vec![Utc.timestamp_opt(0, 0).unwrap()])
//!     .with_values("_pk", vec![Some(1)]).unwrap()
//!     .with_values("_tag_region", vec![Some("us")]).unwrap()
//!     .with_values("activity.calories", vec![Some(250)]).unwrap()
//!     .with_values("activity.steps", vec![Some(1000)]).unwrap();
//!
//! let summary = bridge.write_frame(&frame).unwrap();
//! assert_eq!(summary.accepted, 1);
//!
//! let back = bridge.read_frame(&["activity"], TimeRange::all(), &[]).unwrap();
//! assert!(back.column("_pk").is_none());
//! assert_eq!(back.num_columns(), 3);
//! ```

pub mod assemble;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;
pub mod influx;
pub mod logging;
pub mod point;
pub mod project;

pub use assemble::{Accumulator, AssembleOptions, Assembler, GroupBy};
pub use backend::{
    Backend, MemoryBackend, PointStream, Query, RejectedPoint, TagFilter, TimeRange, WriteSummary,
};
pub use bridge::Bridge;
pub use config::{resolve_config_path, ConfigError, ConfigSource, LoadedConfig, TsFrameConfig};
pub use error::{BackendError, BackendErrorKind, Error, Result, SchemaError};
pub use influx::{Precision, WireError, WriteOptions};
pub use point::{FieldSet, Point, TagSet};
pub use project::{ProjectOptions, Projection, Projector, Points};
