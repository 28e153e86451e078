//! Time-indexed tabular batch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{FrameError, Result};
use crate::value::Value;

/// Row timestamp.
pub type Timestamp = DateTime<Utc>;

/// A named column of optional scalars, one per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Option<Value>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<Value>>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when no row holds a value.
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Ordered rows keyed by timestamp, with named, row-aligned columns.
///
/// Every column has exactly one slot per row. Column names may repeat, as
/// they can in dataframe libraries; consumers decide whether that is
/// ambiguous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    index: Vec<Timestamp>,
    columns: Vec<Column>,
}

impl Frame {
    /// Frame with the given index and no columns.
    pub fn new(index: Vec<Timestamp>) -> Self {
        Frame {
            index,
            columns: Vec::new(),
        }
    }

    /// Append a column, checking it is aligned with the index.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if column.len() != self.index.len() {
            return Err(FrameError::LengthMismatch {
                column: column.name,
                expected: self.index.len(),
                actual: column.values.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Builder-style [`Frame::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<Value>>) -> Result<Self> {
        self.push_column(Column::new(name, values))?;
        Ok(self)
    }

    /// Like [`Frame::with_column`], converting each present value.
    pub fn with_values<V, I>(self, name: impl Into<String>, values: I) -> Result<Self>
    where
        V: Into<Value>,
        I: IntoIterator<Item = Option<V>>,
    {
        let values = values.into_iter().map(|v| v.map(Into::into)).collect();
        self.with_column(name, values)
    }

    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// First column with this name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Value at `(row, column position)`.
    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// Columns sorted by name (stable for repeated names).
    pub fn sort_columns(mut self) -> Self {
        self.columns.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }

    /// Rows sorted by timestamp; equal timestamps keep their order.
    pub fn sort_by_index(self) -> Self {
        let mut order: Vec<usize> = (0..self.index.len()).collect();
        order.sort_by_key(|&i| self.index[i]);
        self.take_rows(&order)
    }

    /// Drop columns that hold no value at all.
    pub fn drop_null_columns(mut self) -> Self {
        self.columns.retain(|c| !c.is_all_null());
        self
    }

    /// Drop rows in which every column is null.
    pub fn drop_null_rows(self) -> Self {
        let keep: Vec<usize> = (0..self.index.len())
            .filter(|&row| self.columns.iter().any(|c| c.get(row).is_some()))
            .collect();
        self.take_rows(&keep)
    }

    fn take_rows(self, rows: &[usize]) -> Self {
        let index = rows.iter().map(|&i| self.index[i]).collect();
        let columns = self
            .columns
            .into_iter()
            .map(|c| Column {
                values: rows.iter().map(|&i| c.values[i].clone()).collect(),
                name: c.name,
            })
            .collect();
        Frame { index, columns }
    }
}

/// Row-wise frame construction with a growing column union.
///
/// New columns are backfilled with `None` for earlier rows and every new row
/// starts as all-`None`, so the result always satisfies the frame invariant.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    index: Vec<Timestamp>,
    columns: Vec<Column>,
    positions: HashMap<String, usize>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty row and return its position.
    pub fn push_row(&mut self, timestamp: Timestamp) -> usize {
        self.index.push(timestamp);
        for column in &mut self.columns {
            column.values.push(None);
        }
        self.index.len() - 1
    }

    /// Mutable cell at `(row, column)`, creating the column if needed.
    ///
    /// # Panics
    ///
    /// Panics if `row` was not returned by [`FrameBuilder::push_row`].
    pub fn slot(&mut self, row: usize, column: &str) -> &mut Option<Value> {
        assert!(row < self.index.len(), "row {} out of bounds", row);
        let pos = match self.positions.get(column) {
            Some(&pos) => pos,
            None => {
                let pos = self.columns.len();
                self.columns
                    .push(Column::new(column, vec![None; self.index.len()]));
                self.positions.insert(column.to_string(), pos);
                pos
            }
        };
        &mut self.columns[pos].values[row]
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn finish(self) -> Frame {
        Frame {
            index: self.index,
            columns: self.columns,
        }
    }
}
