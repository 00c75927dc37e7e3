//! Namespaces: extra groups of operations attached to a source.
//!
//! A namespace bundles functions under one name, e.g. an `np` namespace for
//! array-like outputs, so `source.np.mean()` style access builds a pipeline
//! without the functions being registered as conversions.

use std::collections::{BTreeMap, HashMap};

use datacat_core::{Error, OutputType, Result};

use crate::pipeline::Pipeline;
use crate::source::Source;
use crate::step::{Operation, Step};
use crate::transform::{Args, Kwargs, Transform};

/// A named group of functions bound to one source.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    source: Source,
    functions: BTreeMap<String, Transform>,
}

impl Namespace {
    /// Creates an empty namespace bound to `source`.
    pub fn new(name: impl Into<String>, source: Source) -> Self {
        Self {
            name: name.into(),
            source,
            functions: BTreeMap::new(),
        }
    }

    /// Adds a function, keyed by its name.
    pub fn with_function(mut self, function: Transform) -> Self {
        self.functions.insert(function.name().to_owned(), function);
        self
    }

    /// Returns the namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bound source.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Returns the function names in sorted order.
    pub fn functions(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    /// Builds a pipeline applying `function` to the bound source.
    pub fn call(&self, function: &str, args: Args, kwargs: Kwargs) -> Result<Pipeline> {
        let transform = self.functions.get(function).ok_or_else(|| Error::UnknownMethod {
            name: format!("{}.{function}", self.name),
        })?;

        let step = Step::new(Operation::Apply(transform.clone()))
            .with_args(args)
            .with_kwargs(kwargs);
        Ok(self.source.with_step(step, transform.output_type().clone()))
    }
}

/// Supplies the namespaces available for a source.
///
/// Queried on every attribute resolution; implementations must not assume
/// their results are cached.
pub trait NamespaceProvider: std::fmt::Debug + Send + Sync {
    /// Returns the namespaces for `source`, keyed by name.
    fn namespaces(&self, source: &Source) -> Result<BTreeMap<String, Namespace>>;
}

/// Provider with no namespaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNamespaces;

impl NamespaceProvider for NoNamespaces {
    fn namespaces(&self, _source: &Source) -> Result<BTreeMap<String, Namespace>> {
        Ok(BTreeMap::new())
    }
}

#[derive(Debug, Clone, Default)]
struct NamespaceFunctions {
    functions: Vec<Transform>,
}

/// Namespaces declared per output type.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    by_type: HashMap<OutputType, BTreeMap<String, NamespaceFunctions>>,
}

impl NamespaceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `function` to namespace `name` for sources of `output_type`.
    pub fn register(
        &mut self,
        output_type: impl Into<OutputType>,
        name: impl Into<String>,
        function: Transform,
    ) -> &mut Self {
        self.by_type
            .entry(output_type.into())
            .or_default()
            .entry(name.into())
            .or_default()
            .functions
            .push(function);
        self
    }
}

impl NamespaceProvider for NamespaceTable {
    fn namespaces(&self, source: &Source) -> Result<BTreeMap<String, Namespace>> {
        let Some(declared) = self.by_type.get(&source.output_type()) else {
            return Ok(BTreeMap::new());
        };

        let namespaces = declared
            .iter()
            .map(|(name, entry)| {
                let namespace = entry
                    .functions
                    .iter()
                    .cloned()
                    .fold(Namespace::new(name.clone(), source.clone()), Namespace::with_function);
                (name.clone(), namespace)
            })
            .collect();
        Ok(namespaces)
    }
}

#[cfg(test)]
mod tests {
    use datacat_core::{Literal, Value};
    use serde_json::json;

    use super::*;
    use crate::transform::Call;

    fn mean() -> Transform {
        Transform::new("mean", "json:Number", |call: Call<'_>| {
            let items = call.into_input()?.into_json()?;
            let values: Vec<f64> = items
                .as_array()
                .map(|items| items.iter().filter_map(|n| n.as_f64()).collect())
                .unwrap_or_default();
            let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
            Ok(Value::Json(json!(mean)))
        })
    }

    fn array() -> Source {
        Source::reader(Literal::new("numpy:ndarray", json!([1.0, 2.0, 3.0])))
    }

    #[test]
    fn test_table_binds_source() {
        let mut table = NamespaceTable::new();
        table.register("numpy:ndarray", "np", mean());

        let namespaces = table.namespaces(&array()).unwrap();
        let np = &namespaces["np"];
        assert_eq!(np.name(), "np");
        assert_eq!(np.functions(), vec!["mean"]);

        let pipeline = np.call("mean", Args::new(), Kwargs::new()).unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.output_type(), "json:Number");
        assert_eq!(pipeline.read().unwrap(), Value::Json(json!(2.0)));
    }

    #[test]
    fn test_other_types_have_no_namespaces() {
        let mut table = NamespaceTable::new();
        table.register("numpy:ndarray", "np", mean());

        let source = Source::reader(Literal::new("pandas:DataFrame", json!({})));
        assert!(table.namespaces(&source).unwrap().is_empty());
        assert!(NoNamespaces.namespaces(&source).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_function_is_rejected() {
        let np = Namespace::new("np", array());
        let err = np.call("median", Args::new(), Kwargs::new()).unwrap_err();
        assert_eq!(err.to_string(), "unknown method: np.median");
    }
}
