//! Time-indexed tabular batches for tsframe.
//!
//! This crate provides:
//! - [`Value`]: the scalar stored in a cell
//! - [`Frame`]: rows keyed by timestamp with named, row-aligned columns
//! - [`FrameBuilder`]: row-wise construction with a growing column union
//! - Arrow `RecordBatch` conversion, so any Arrow-based dataframe library can
//!   hand batches to the projector and take assembled results back

pub mod error;
pub mod frame;
pub mod record_batch;
pub mod value;

pub use error::{FrameError, Result};
pub use frame::{Column, Frame, FrameBuilder, Timestamp};
pub use record_batch::{
    frame_schema, from_record_batch, pretty_format, to_record_batch, DEFAULT_TIME_COLUMN,
};
pub use value::{Value, ValueKind};
