//! Reader that always fails.

use datacat_core::{Error, OutputType, Reader, Result, Value};

/// Fails every read with an execution error carrying `message`.
#[derive(Debug, Clone)]
pub struct FailingReader {
    output_type: OutputType,
    message: String,
}

impl FailingReader {
    /// Creates a reader declaring `output_type` that fails with `message`.
    pub fn new(output_type: impl Into<OutputType>, message: impl Into<String>) -> Self {
        Self {
            output_type: output_type.into(),
            message: message.into(),
        }
    }
}

impl Reader for FailingReader {
    fn output_type(&self) -> OutputType {
        self.output_type.clone()
    }

    fn read(&self) -> Result<Value> {
        Err(Error::execution(self.message.clone()))
    }
}
