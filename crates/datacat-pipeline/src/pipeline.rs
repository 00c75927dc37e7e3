//! Lazy pipelines of steps.

use std::fmt;

use datacat_core::{Error, OutputType, Reader, ReaderRef, Result, Value};

use crate::TRACING_TARGET_PIPELINE;
use crate::step::Step;

/// An ordered, lazy composition of steps; itself a [`Reader`].
///
/// The first step is usually the reader the pipeline was built from. Each
/// step has the output type declared for its result, so `output_types` and
/// `steps` always have the same length and the pipeline's own output type is
/// the last entry.
///
/// Nothing runs until [`read`](Pipeline::read), which replays every step
/// from the start each time it is called.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
    output_types: Vec<OutputType>,
}

impl Pipeline {
    /// Creates a single-step pipeline materializing `reader`.
    pub fn new(reader: ReaderRef) -> Self {
        let output_type = reader.output_type();
        Self {
            steps: vec![Step::read(reader)],
            output_types: vec![output_type],
        }
    }

    /// Creates a pipeline from explicit steps and their output types.
    pub fn from_steps(steps: Vec<Step>, output_types: Vec<OutputType>) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::InvalidPipeline("a pipeline needs at least one step".into()));
        }
        if steps.len() != output_types.len() {
            return Err(Error::InvalidPipeline(format!(
                "{} steps but {} output types",
                steps.len(),
                output_types.len()
            )));
        }
        Ok(Self {
            steps,
            output_types,
        })
    }

    /// Returns a new pipeline with `step` appended.
    ///
    /// The receiver is left untouched; both pipelines share no mutable state.
    #[must_use = "with_step returns a new pipeline"]
    pub fn with_step(&self, step: Step, output_type: impl Into<OutputType>) -> Self {
        let mut next = self.clone();
        next.steps.push(step);
        next.output_types.push(output_type.into());

        tracing::trace!(
            target: TRACING_TARGET_PIPELINE,
            steps = next.steps.len(),
            output_type = %next.output_type(),
            "Appended step"
        );
        next
    }

    /// Returns the declared output type of the final step.
    pub fn output_type(&self) -> OutputType {
        self.output_types.last().cloned().unwrap_or_default()
    }

    /// Returns the steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the declared output type after each step.
    pub fn output_types(&self) -> &[OutputType] {
        &self.output_types
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: a pipeline has at least one step.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Materializes the pipeline by running every step in order.
    ///
    /// Each step receives the previous step's result; the first receives
    /// nothing. The first error aborts the run and is returned unchanged.
    pub fn read(&self) -> Result<Value> {
        tracing::debug!(
            target: TRACING_TARGET_PIPELINE,
            steps = self.steps.len(),
            output_type = %self.output_type(),
            "Materializing pipeline"
        );

        let mut value = None;
        for (index, step) in self.steps.iter().enumerate() {
            value = Some(step.run(index, value.take())?);
        }
        value.ok_or_else(|| Error::InvalidPipeline("a pipeline needs at least one step".into()))
    }
}

impl Reader for Pipeline {
    fn output_type(&self) -> OutputType {
        Pipeline::output_type(self)
    }

    fn read(&self) -> Result<Value> {
        Pipeline::read(self)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline -> {}", self.output_type())?;
        for (index, (step, output_type)) in self.steps.iter().zip(&self.output_types).enumerate() {
            writeln!(f, "  {index}: {step} -> {output_type}")?;
        }
        Ok(())
    }
}
