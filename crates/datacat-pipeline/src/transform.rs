//! Transformation callables and their call arguments.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use datacat_core::{Error, Json, OutputType, Result, Value};

/// Positional arguments of a step.
pub type Args = Vec<Json>;

/// Keyword arguments of a step.
pub type Kwargs = BTreeMap<String, Json>;

/// Arguments handed to a transformation when its step runs.
///
/// `input` is the value produced by the previous step; it is absent only
/// when the transformation is the first step of a pipeline.
#[derive(Debug)]
pub struct Call<'a> {
    step: usize,
    input: Option<Value>,
    args: &'a [Json],
    kwargs: &'a Kwargs,
}

impl<'a> Call<'a> {
    /// Creates a call.
    pub fn new(step: usize, input: Option<Value>, args: &'a [Json], kwargs: &'a Kwargs) -> Self {
        Self {
            step,
            input,
            args,
            kwargs,
        }
    }

    /// Position of the running step in its pipeline.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Returns whether an upstream value was provided.
    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Returns the upstream value.
    pub fn input(&self) -> Result<&Value> {
        self.input.as_ref().ok_or(Error::MissingInput { step: self.step })
    }

    /// Takes ownership of the upstream value.
    pub fn into_input(self) -> Result<Value> {
        self.input.ok_or(Error::MissingInput { step: self.step })
    }

    /// Positional arguments.
    pub fn args(&self) -> &'a [Json] {
        self.args
    }

    /// Keyword arguments.
    pub fn kwargs(&self) -> &'a Kwargs {
        self.kwargs
    }

    /// Returns a positional argument.
    pub fn arg(&self, index: usize) -> Option<&'a Json> {
        self.args.get(index)
    }

    /// Returns a keyword argument.
    pub fn kwarg(&self, name: &str) -> Option<&'a Json> {
        self.kwargs.get(name)
    }
}

type TransformFn = dyn for<'a> Fn(Call<'a>) -> Result<Value> + Send + Sync;

/// A named transformation producing a value of a declared output type.
#[derive(Clone)]
pub struct Transform {
    name: String,
    output_type: OutputType,
    func: Arc<TransformFn>,
}

impl Transform {
    /// Creates a transformation.
    pub fn new<F>(name: impl Into<String>, output_type: impl Into<OutputType>, func: F) -> Self
    where
        F: for<'a> Fn(Call<'a>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            output_type: output_type.into(),
            func: Arc::new(func),
        }
    }

    /// Name the transformation is looked up by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared output type.
    pub fn output_type(&self) -> &OutputType {
        &self.output_type
    }

    /// Label item access matches against: the declared output type, or the
    /// name when the output type is unresolved.
    pub fn output_key(&self) -> &str {
        if self.output_type.is_known() {
            self.output_type.as_str()
        } else {
            &self.name
        }
    }

    /// Invokes the transformation.
    pub fn call(&self, call: Call<'_>) -> Result<Value> {
        (self.func)(call)
    }

    /// Returns whether both handles share the same callable.
    pub fn same_func(&self, other: &Transform) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .field("output_type", &self.output_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_call_accessors() {
        let args = vec![json!(2)];
        let mut kwargs = Kwargs::new();
        kwargs.insert("fill".into(), json!(0));

        let call = Call::new(3, None, &args, &kwargs);
        assert_eq!(call.step(), 3);
        assert!(!call.has_input());
        assert_eq!(call.arg(0), Some(&json!(2)));
        assert_eq!(call.kwarg("fill"), Some(&json!(0)));
        assert!(matches!(call.input(), Err(Error::MissingInput { step: 3 })));
    }

    #[test]
    fn test_transform_invocation() {
        let double = Transform::new("double", "json:Number", |call: Call<'_>| {
            let n = call.into_input()?.into_json()?.as_i64().unwrap_or_default();
            Ok(Value::from(n * 2))
        });

        let kwargs = Kwargs::new();
        let out = double
            .call(Call::new(1, Some(Value::from(21_i64)), &[], &kwargs))
            .unwrap();
        assert_eq!(out, Value::from(42_i64));
        assert_eq!(double.output_type(), &OutputType::from("json:Number"));
        assert!(double.same_func(&double.clone()));
    }

    #[test]
    fn test_output_key_falls_back_to_name() {
        let typed = Transform::new("to_json", "json:Records", |call: Call<'_>| call.into_input());
        let untyped = Transform::new("pick", "", |call: Call<'_>| call.into_input());
        assert_eq!(typed.output_key(), "json:Records");
        assert_eq!(untyped.output_key(), "pick");
    }
}
