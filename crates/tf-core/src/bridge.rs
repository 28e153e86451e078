//! Frame-level read and write against one backend.

use tf_frame::Frame;

use crate::assemble::Assembler;
use crate::backend::{Backend, Query, TagFilter, TimeRange, WriteSummary};
use crate::config::TsFrameConfig;
use crate::error::{Error, Result};
use crate::point::Point;
use crate::project::Projector;

/// Projector, assembler and backend wired together.
#[derive(Debug)]
pub struct Bridge<B> {
    projector: Projector,
    assembler: Assembler,
    backend: B,
}

impl<B: Backend> Bridge<B> {
    pub fn new(projector: Projector, assembler: Assembler, backend: B) -> Self {
        Bridge {
            projector,
            assembler,
            backend,
        }
    }

    pub fn from_config(config: &TsFrameConfig, backend: B) -> Result<Self> {
        Ok(Self::new(config.projector()?, config.assembler()?, backend))
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Project `frame` and write every resulting point.
    ///
    /// A frame without any storable field is `EmptyInput`. Points the
    /// backend rejects individually are logged and reported in the summary.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<WriteSummary> {
        let points: Vec<Point> = self.projector.project(frame)?.iter().collect();
        if points.is_empty() {
            return Err(Error::EmptyInput(format!(
                "{} rows x {} columns yield no fields",
                frame.num_rows(),
                frame.num_columns()
            )));
        }

        let summary = self.backend.write(&points)?;
        for rejected in &summary.rejected {
            let measurement = points
                .get(rejected.index)
                .map(|p| p.measurement.as_str())
                .unwrap_or_default();
            tracing::warn!(
                index = rejected.index,
                measurement,
                reason = %rejected.reason,
                "backend rejected point"
            );
        }
        tracing::info!(
            rows = frame.num_rows(),
            points = points.len(),
            accepted = summary.accepted,
            rejected = summary.rejected.len(),
            "wrote frame"
        );
        Ok(summary)
    }

    /// Query measurements and assemble the results into one frame.
    ///
    /// An empty `measurements` slice reads every measurement the backend
    /// lists, which fails for adapters without `list_measurements`.
    pub fn read_frame(
        &mut self,
        measurements: &[&str],
        range: TimeRange,
        filters: &[TagFilter],
    ) -> Result<Frame> {
        let names: Vec<String> = if measurements.is_empty() {
            self.backend.list_measurements()?.into_iter().collect()
        } else {
            measurements.iter().map(|m| m.to_string()).collect()
        };

        let queried = names.len();
        let mut acc = self.assembler.accumulator();
        for measurement in names {
            let query = Query {
                measurement,
                range,
                filters: filters.to_vec(),
            };
            for point in self.backend.query(&query)? {
                acc.push(point?)?;
            }
        }

        let points = acc.num_points();
        let frame = acc.finish();
        tracing::info!(
            measurements = queried,
            points,
            rows = frame.num_rows(),
            columns = frame.num_columns(),
            "read frame"
        );
        Ok(frame)
    }
}
