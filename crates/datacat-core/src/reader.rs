//! The reader contract and two basic readers.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::output_type::OutputType;
use crate::value::{Metadata, Value};

/// Shared handle to a reader.
pub type ReaderRef = Arc<dyn Reader>;

/// Describes how to produce a value of some output type.
///
/// Constructing a reader does no work; [`read`](Reader::read) materializes
/// the value and may block on I/O. Every call to `read` starts from scratch.
pub trait Reader: fmt::Debug + Send + Sync {
    /// Label of the kind of value [`read`](Reader::read) produces.
    fn output_type(&self) -> OutputType;

    /// Materializes the value.
    fn read(&self) -> Result<Value>;

    /// Opaque descriptive metadata.
    fn metadata(&self) -> Metadata {
        Metadata::default()
    }
}

/// Reader returning a fixed value.
#[derive(Debug, Clone)]
pub struct Literal {
    value: Value,
    output_type: OutputType,
    metadata: Metadata,
}

impl Literal {
    /// Creates a reader that always produces `value`.
    pub fn new(output_type: impl Into<OutputType>, value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            output_type: output_type.into(),
            metadata: Metadata::default(),
        }
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Reader for Literal {
    fn output_type(&self) -> OutputType {
        self.output_type.clone()
    }

    fn read(&self) -> Result<Value> {
        Ok(self.value.clone())
    }

    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }
}

type ReadFn = dyn Fn() -> Result<Value> + Send + Sync;

/// Reader backed by a closure.
#[derive(Clone)]
pub struct FnReader {
    output_type: OutputType,
    read_fn: Arc<ReadFn>,
}

impl FnReader {
    /// Creates a reader that calls `read_fn` on every read.
    pub fn new<F>(output_type: impl Into<OutputType>, read_fn: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            output_type: output_type.into(),
            read_fn: Arc::new(read_fn),
        }
    }
}

impl Reader for FnReader {
    fn output_type(&self) -> OutputType {
        self.output_type.clone()
    }

    fn read(&self) -> Result<Value> {
        (self.read_fn)()
    }
}

impl fmt::Debug for FnReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReader")
            .field("output_type", &self.output_type)
            .finish_non_exhaustive()
    }
}
