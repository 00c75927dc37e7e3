//! Resolves operation requests against the transformations known for a
//! source's output type.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use datacat_core::{Error, Key, OutputType, Result};

use crate::TRACING_TARGET_DISPATCH;
use crate::config::DispatchConfig;
use crate::methods::MethodTable;
use crate::pipeline::Pipeline;
use crate::registry::FuncDict;
use crate::source::Source;
use crate::step::{Operation, Step};
use crate::transform::{Args, Kwargs, Transform};

/// A source bound to the transformations applicable to its output type.
///
/// Built fresh on every [`Dispatcher::transform`](crate::Dispatcher::transform)
/// call, so it always reflects the registry as it is now. Every request
/// returns a new pipeline and leaves the bound source untouched.
#[derive(Debug, Clone)]
pub struct Functioner {
    source: Source,
    funcdict: FuncDict,
    methods: Arc<MethodTable>,
    config: Arc<DispatchConfig>,
}

impl Functioner {
    /// Binds `source` to `funcdict`.
    pub fn new(
        source: Source,
        funcdict: FuncDict,
        methods: Arc<MethodTable>,
        config: Arc<DispatchConfig>,
    ) -> Self {
        Self {
            source,
            funcdict,
            methods,
            config,
        }
    }

    /// Returns the bound source.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Returns the applicable transformations.
    pub fn funcdict(&self) -> &FuncDict {
        &self.funcdict
    }

    /// Returns the output types reachable by item access, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let keys: BTreeSet<&str> = self.funcdict.values().map(Transform::output_key).collect();
        keys.into_iter().collect()
    }

    /// Returns the sorted names of the applicable transformations.
    pub fn dir(&self) -> Vec<&str> {
        self.funcdict.keys().map(String::as_str).collect()
    }

    /// Returns whether `name` is an applicable transformation name.
    pub fn contains(&self, name: &str) -> bool {
        self.funcdict.contains_key(name)
    }

    /// Item access: converts to the output type `key` if a transformation
    /// produces it, otherwise defers a get-item step. When several do, the
    /// first by name is used.
    ///
    /// For a get-item step the declared output type is the key itself, a
    /// placeholder since the real type is unknown until executed.
    pub fn item(&self, key: impl Into<Key>) -> Pipeline {
        let key = key.into();
        let label = key.to_string();

        let converter = self
            .funcdict
            .values()
            .find(|transform| transform.output_key() == label);

        let operation = match converter {
            Some(transform) => Operation::Transform(transform.clone()),
            None => Operation::GetItem(key),
        };

        self.append(Step::new(operation), OutputType::from(label))
    }

    /// Attribute access: applies the transformation called `name`, or defers
    /// a call of method `name` on the materialized value.
    ///
    /// Fails only when the dispatch configuration forbids the method-call
    /// fallback for `name`.
    pub fn attr(&self, name: &str) -> Result<Pipeline> {
        if let Some(transform) = self.funcdict.get(name) {
            let step = Step::new(Operation::Transform(transform.clone()));
            return Ok(self.append(step, OutputType::from(transform.output_key())));
        }

        if !self.config.permits_generic_call(name) {
            return Err(Error::GenericCallDenied {
                name: name.to_owned(),
            });
        }

        tracing::trace!(
            target: TRACING_TARGET_DISPATCH,
            method = name,
            output_type = %self.source.output_type(),
            "Deferring generic method call"
        );

        let step = Step::new(Operation::MethodCall {
            name: name.to_owned(),
            methods: Arc::clone(&self.methods),
        });
        Ok(self.append(step, self.source.output_type()))
    }

    /// Direct call: applies `func` with the given arguments.
    ///
    /// The declared output type is `output_type`, or unresolved if `None`.
    pub fn call(
        &self,
        func: Transform,
        args: Args,
        kwargs: Kwargs,
        output_type: Option<OutputType>,
    ) -> Pipeline {
        let step = Step::new(Operation::Apply(func))
            .with_args(args)
            .with_kwargs(kwargs);
        self.append(step, output_type.unwrap_or_default())
    }

    fn append(&self, step: Step, output_type: OutputType) -> Pipeline {
        self.source.with_step(step, output_type)
    }
}

impl fmt::Display for Functioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transformers for {}:", self.source.output_type())?;
        for (name, transform) in &self.funcdict {
            writeln!(f, "  {}: {name}", transform.output_key())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use datacat_core::{Literal, Value};
    use serde_json::json;

    use super::*;
    use crate::registry::Registry;
    use crate::transform::Call;

    fn frame() -> Source {
        Source::reader(Literal::new(
            "pandas:DataFrame",
            json!({"a": [1, 2, 3], "b": [4, 5, 6]}),
        ))
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            "pandas:DataFrame",
            Transform::new("to_records", "json:Records", |call: Call<'_>| {
                let input = call.into_input()?.into_json()?;
                let keys: Vec<_> = input.as_object().map(|m| m.keys().cloned().collect()).unwrap_or_default();
                Ok(Value::Json(json!(keys)))
            }),
        );
        registry
    }

    fn functioner(config: DispatchConfig) -> Functioner {
        let registry = registry();
        let source = frame();
        let funcdict = registry.convert_classes(&source.output_type());
        Functioner::new(source, funcdict, registry.methods(), Arc::new(config))
    }

    #[test]
    fn test_dir_and_keys() {
        let functioner = functioner(DispatchConfig::default());
        assert_eq!(functioner.dir(), vec!["to_records"]);
        assert_eq!(functioner.keys(), vec!["json:Records"]);
        assert!(functioner.contains("to_records"));
        assert!(!functioner.contains("json:Records"));
    }

    #[test]
    fn test_attr_uses_registered_transform() {
        let pipeline = functioner(DispatchConfig::default()).attr("to_records").unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.output_type(), "json:Records");
        assert!(matches!(pipeline.steps()[1].operation(), Operation::Transform(_)));
        assert_eq!(pipeline.read().unwrap(), Value::Json(json!(["a", "b"])));
    }

    #[test]
    fn test_attr_falls_back_to_method_call() {
        let pipeline = functioner(DispatchConfig::default()).attr("len").unwrap();
        assert_eq!(pipeline.output_type(), "pandas:DataFrame");
        assert!(matches!(
            pipeline.steps()[1].operation(),
            Operation::MethodCall { name, .. } if name == "len"
        ));
        assert_eq!(pipeline.read().unwrap(), Value::Json(json!(2)));
    }

    #[test]
    fn test_unknown_method_fails_only_when_read() {
        let pipeline = functioner(DispatchConfig::default()).attr("no_such_method").unwrap();
        assert!(matches!(pipeline.read(), Err(Error::UnknownMethod { .. })));
    }

    #[test]
    fn test_attr_respects_generic_call_policy() {
        let config = DispatchConfig::builder()
            .allow_generic_calls(false)
            .build()
            .unwrap();
        let functioner = functioner(config);

        assert!(functioner.attr("to_records").is_ok());
        assert!(matches!(
            functioner.attr("len"),
            Err(Error::GenericCallDenied { ref name }) if name == "len"
        ));
    }

    #[test]
    fn test_item_converts_by_output_type() {
        let pipeline = functioner(DispatchConfig::default()).item("json:Records");
        assert_eq!(pipeline.output_type(), "json:Records");
        assert!(matches!(pipeline.steps()[1].operation(), Operation::Transform(_)));
    }

    #[test]
    fn test_item_defers_get_item_with_placeholder_type() {
        let pipeline = functioner(DispatchConfig::default()).item("a");
        assert_eq!(pipeline.output_type(), "a");
        assert!(matches!(pipeline.steps()[1].operation(), Operation::GetItem(Key::Name(k)) if k == "a"));
        assert_eq!(pipeline.read().unwrap(), Value::Json(json!([1, 2, 3])));
    }

    #[test]
    fn test_item_on_pipeline_extends_it() {
        let first = functioner(DispatchConfig::default()).item("b");
        let registry = Registry::new();
        let source = Source::from(first.clone());
        let functioner = Functioner::new(
            source,
            registry.convert_classes(&first.output_type()),
            registry.methods(),
            Arc::new(DispatchConfig::default()),
        );

        let second = functioner.item(-1_i32);
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 3);
        assert_eq!(second.read().unwrap(), Value::Json(json!(6)));
    }

    #[test]
    fn test_call_declares_output_type() {
        let functioner = functioner(DispatchConfig::default());
        let pick = Transform::new("pick", "", |call: Call<'_>| {
            let column = call.arg(0).and_then(|c| c.as_str()).unwrap_or_default().to_owned();
            call.into_input()?.get_item(&Key::Name(column))
        });

        let declared = functioner.call(pick.clone(), vec![json!("b")], Kwargs::new(), Some("json:Array".into()));
        assert_eq!(declared.output_type(), "json:Array");
        assert_eq!(declared.read().unwrap(), Value::Json(json!([4, 5, 6])));

        let undeclared = functioner.call(pick, vec![json!("a")], Kwargs::new(), None);
        assert!(!undeclared.output_type().is_known());
    }

    #[test]
    fn test_same_typed_transforms_all_resolve() {
        let mut registry = registry();
        let first = Transform::new("head", "pandas:DataFrame", |call: Call<'_>| call.into_input());
        let last = Transform::new("tail", "pandas:DataFrame", |call: Call<'_>| call.into_input());
        registry
            .register("pandas:DataFrame", first)
            .register("pandas:DataFrame", last);

        let source = frame();
        let functioner = Functioner::new(
            source.clone(),
            registry.convert_classes(&source.output_type()),
            registry.methods(),
            Arc::new(DispatchConfig::default()),
        );
        assert_eq!(functioner.dir(), vec!["head", "tail", "to_records"]);
        assert_eq!(functioner.keys(), vec!["json:Records", "pandas:DataFrame"]);

        for name in ["head", "tail"] {
            let pipeline = functioner.attr(name).unwrap();
            assert_eq!(pipeline.output_type(), "pandas:DataFrame");
            assert!(matches!(pipeline.steps()[1].operation(), Operation::Transform(t) if t.name() == name));
        }

        let converted = functioner.item("pandas:DataFrame");
        assert!(matches!(converted.steps()[1].operation(), Operation::Transform(t) if t.name() == "head"));
    }

    #[test]
    fn test_display() {
        let rendered = functioner(DispatchConfig::default()).to_string();
        assert_eq!(rendered, "Transformers for pandas:DataFrame:\n  json:Records: to_records\n");
    }
}
