//! Pipeline steps.

use std::fmt;
use std::sync::Arc;

use datacat_core::{Key, ReaderRef, Result, Value};

use crate::TRACING_TARGET_PIPELINE;
use crate::methods::MethodTable;
use crate::transform::{Args, Call, Kwargs, Transform};

/// What a step does when it runs.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Materialize a reader; any upstream value is ignored.
    Read(ReaderRef),
    /// Apply a transformation found in the registry.
    Transform(Transform),
    /// Index the upstream value by key.
    GetItem(Key),
    /// Call a method by name on the upstream value.
    ///
    /// This is the reflective fallback used when a requested name is not a
    /// registered transformation.
    MethodCall {
        /// Method name.
        name: String,
        /// Methods available when the step runs.
        methods: Arc<MethodTable>,
    },
    /// Apply an arbitrary caller-supplied function.
    Apply(Transform),
}

impl Operation {
    /// Returns a short label for the operation.
    pub fn label(&self) -> String {
        match self {
            Self::Read(reader) => format!("read<{}>", reader.output_type()),
            Self::Transform(transform) => transform.name().to_owned(),
            Self::GetItem(key) => format!("[{key}]"),
            Self::MethodCall { name, .. } => format!(".{name}()"),
            Self::Apply(transform) => format!("apply({})", transform.name()),
        }
    }
}

/// An operation together with its positional and keyword arguments.
///
/// Steps are immutable once they are part of a pipeline.
#[derive(Debug, Clone)]
pub struct Step {
    operation: Operation,
    args: Args,
    kwargs: Kwargs,
}

impl Step {
    /// Creates a step without arguments.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            args: Args::new(),
            kwargs: Kwargs::new(),
        }
    }

    /// Creates a step materializing a reader.
    pub fn read(reader: ReaderRef) -> Self {
        Self::new(Operation::Read(reader))
    }

    /// Sets the positional arguments.
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    /// Sets the keyword arguments.
    pub fn with_kwargs(mut self, kwargs: Kwargs) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Returns the operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Returns the positional arguments.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Returns the keyword arguments.
    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    /// Runs the step at position `index` on the upstream value.
    pub(crate) fn run(&self, index: usize, input: Option<Value>) -> Result<Value> {
        tracing::trace!(
            target: TRACING_TARGET_PIPELINE,
            step = index,
            operation = %self.operation.label(),
            has_input = input.is_some(),
            "Running step"
        );

        let call = Call::new(index, input, &self.args, &self.kwargs);
        match &self.operation {
            Operation::Read(reader) => reader.read(),
            Operation::Transform(transform) | Operation::Apply(transform) => transform.call(call),
            Operation::GetItem(key) => call.input()?.get_item(key),
            Operation::MethodCall { name, methods } => methods.call(name, call),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.operation.label())?;
        if !self.args.is_empty() || !self.kwargs.is_empty() {
            let args = self.args.iter().map(ToString::to_string);
            let kwargs = self.kwargs.iter().map(|(k, v)| format!("{k}={v}"));
            let rendered: Vec<String> = args.chain(kwargs).collect();
            write!(f, " ({})", rendered.join(", "))?;
        }
        Ok(())
    }
}
