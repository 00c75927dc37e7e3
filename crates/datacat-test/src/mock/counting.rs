//! Reader that counts its reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use datacat_core::{Metadata, OutputType, Reader, Result, Value};

/// Returns a fixed value and records how often it was read.
#[derive(Debug, Clone)]
pub struct CountingReader {
    output_type: OutputType,
    value: Value,
    reads: Arc<AtomicUsize>,
}

impl CountingReader {
    /// Creates a reader producing `value`.
    pub fn new(output_type: impl Into<OutputType>, value: impl Into<Value>) -> Self {
        Self {
            output_type: output_type.into(),
            value: value.into(),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of completed reads across all clones.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Reader for CountingReader {
    fn output_type(&self) -> OutputType {
        self.output_type.clone()
    }

    fn read(&self) -> Result<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }

    fn metadata(&self) -> Metadata {
        Metadata::from([("reads".to_owned(), self.reads().into())])
    }
}
