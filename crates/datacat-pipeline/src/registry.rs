//! Output-type registry.
//!
//! Maps the output type of a reader to the transformations applicable to
//! values of that type. The registry is populated once, before dispatching
//! starts, and only read afterwards.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use datacat_core::{Error, OutputType, Result, Value};
use regex::{Regex, RegexBuilder};

use crate::methods::MethodTable;
use crate::transform::{Call, Transform};

/// Transformations applicable to one output type, keyed by name.
///
/// Several transformations may produce the same output type; see
/// [`Transform::output_key`] for the label item access matches against.
pub type FuncDict = BTreeMap<String, Transform>;

/// Registry of transformations, output-type docs and generic methods.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    exact: HashMap<OutputType, Vec<Transform>>,
    patterns: Vec<(Regex, Transform)>,
    docs: HashMap<OutputType, String>,
    methods: Arc<MethodTable>,
}

impl Registry {
    /// Creates a registry holding only the built-in generic methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transformation applicable to values of `input`.
    pub fn register(&mut self, input: impl Into<OutputType>, transform: Transform) -> &mut Self {
        self.exact.entry(input.into()).or_default().push(transform);
        self
    }

    /// Registers a transformation applicable to every output type matching
    /// `pattern`, a case-insensitive regular expression.
    pub fn register_pattern(&mut self, pattern: &str, transform: Transform) -> Result<&mut Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| Error::Configuration(format!("invalid pattern {pattern:?}: {err}")))?;
        self.patterns.push((regex, transform));
        Ok(self)
    }

    /// Attaches documentation to an output type.
    pub fn register_doc(&mut self, output_type: impl Into<OutputType>, doc: impl Into<String>) -> &mut Self {
        self.docs.insert(output_type.into(), doc.into());
        self
    }

    /// Registers a generic method callable on materialized values.
    pub fn register_method<F>(&mut self, name: impl Into<String>, method: F) -> &mut Self
    where
        F: for<'a> Fn(Call<'a>) -> Result<Value> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.methods).register(name, method);
        self
    }

    /// Returns every transformation applicable to values of `output_type`.
    ///
    /// Pattern registrations are applied first, in registration order, then
    /// exact registrations, so an exact registration wins a name collision.
    /// Unknown output types have no transformations.
    pub fn convert_classes(&self, output_type: &OutputType) -> FuncDict {
        let mut funcdict = FuncDict::new();
        if !output_type.is_known() {
            return funcdict;
        }

        let matching = self
            .patterns
            .iter()
            .filter(|(regex, _)| regex.is_match(output_type.as_str()))
            .map(|(_, transform)| transform);
        let exact = self.exact.get(output_type).into_iter().flatten();

        for transform in matching.chain(exact) {
            funcdict.insert(transform.name().to_owned(), transform.clone());
        }
        funcdict
    }

    /// Returns the documentation attached to an output type.
    pub fn output_doc(&self, output_type: &OutputType) -> Option<&str> {
        self.docs.get(output_type).map(String::as_str)
    }

    /// Returns the generic method table.
    pub fn methods(&self) -> Arc<MethodTable> {
        Arc::clone(&self.methods)
    }
}
