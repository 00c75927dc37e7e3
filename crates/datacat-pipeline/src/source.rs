//! Things the dispatcher operates on: atomic readers and pipelines.

use std::sync::Arc;

use datacat_core::{Metadata, OutputType, Reader, ReaderRef, Result, Value};
use derive_more::From;

use crate::pipeline::Pipeline;
use crate::step::Step;

/// A reader or a pipeline.
#[derive(Debug, Clone, From)]
pub enum Source {
    /// An atomic reader wrapping one data source.
    Reader(ReaderRef),
    /// A composite pipeline.
    Pipeline(Pipeline),
}

impl Source {
    /// Wraps a concrete reader.
    pub fn reader(reader: impl Reader + 'static) -> Self {
        Self::Reader(Arc::new(reader))
    }

    /// Returns the declared output type.
    pub fn output_type(&self) -> OutputType {
        match self {
            Self::Reader(reader) => reader.output_type(),
            Self::Pipeline(pipeline) => pipeline.output_type(),
        }
    }

    /// Materializes the source.
    pub fn read(&self) -> Result<Value> {
        match self {
            Self::Reader(reader) => reader.read(),
            Self::Pipeline(pipeline) => pipeline.read(),
        }
    }

    /// Returns the descriptive metadata without reading.
    pub fn metadata(&self) -> Metadata {
        match self {
            Self::Reader(reader) => reader.metadata(),
            Self::Pipeline(pipeline) => Reader::metadata(pipeline),
        }
    }

    /// Returns the pipeline, if this is one.
    pub fn as_pipeline(&self) -> Option<&Pipeline> {
        match self {
            Self::Pipeline(pipeline) => Some(pipeline),
            Self::Reader(_) => None,
        }
    }

    /// Returns the number of steps; an atomic reader counts as one.
    pub fn step_count(&self) -> usize {
        self.as_pipeline().map_or(1, Pipeline::len)
    }

    /// Returns a pipeline with `step` appended.
    ///
    /// A pipeline is extended; an atomic reader becomes the first step of a
    /// fresh two-step pipeline.
    pub fn with_step(&self, step: Step, output_type: impl Into<OutputType>) -> Pipeline {
        match self {
            Self::Reader(reader) => Pipeline::new(Arc::clone(reader)).with_step(step, output_type),
            Self::Pipeline(pipeline) => pipeline.with_step(step, output_type),
        }
    }

    /// Converts the source into a shareable reader handle.
    pub fn into_reader(self) -> ReaderRef {
        match self {
            Self::Reader(reader) => reader,
            Self::Pipeline(pipeline) => Arc::new(pipeline),
        }
    }
}
