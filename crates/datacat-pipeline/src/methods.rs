//! Generic "call method by name" operations on materialized values.
//!
//! Values carry no reflective methods, so the method names a deferred
//! [`MethodCall`](crate::Operation::MethodCall) step may use are looked up
//! in a [`MethodTable`] when the step runs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use datacat_core::{Error, Json, Key, Result, Value};

use crate::transform::Call;

type MethodFn = dyn for<'a> Fn(Call<'a>) -> Result<Value> + Send + Sync;

/// Named methods callable on materialized values.
#[derive(Clone)]
pub struct MethodTable {
    methods: BTreeMap<String, Arc<MethodFn>>,
}

impl MethodTable {
    /// Creates an empty table.
    pub fn empty() -> Self {
        Self {
            methods: BTreeMap::new(),
        }
    }

    /// Creates a table holding the built-in methods.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.register("len", len);
        table.register("keys", keys);
        table.register("values", values);
        table.register("is_empty", is_empty);
        table.register("first", first);
        table.register("last", last);
        table.register("to_string", to_string);
        table
    }

    /// Registers a method, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, method: F) -> &mut Self
    where
        F: for<'a> Fn(Call<'a>) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Returns whether a method is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Returns the registered method names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Calls a method on the call's input.
    pub fn call(&self, name: &str, call: Call<'_>) -> Result<Value> {
        let method = self.methods.get(name).ok_or_else(|| Error::UnknownMethod {
            name: name.to_owned(),
        })?;
        method(call)
    }
}

impl Default for MethodTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.methods.keys()).finish()
    }
}

fn unsupported(method: &str, value: &Value) -> Error {
    Error::InvalidArgument(format!("{method} is not defined for {} values", value.kind()))
}

fn len(call: Call<'_>) -> Result<Value> {
    let input = call.input()?;
    let len = match input {
        Value::Json(Json::Array(items)) => items.len(),
        Value::Json(Json::Object(map)) => map.len(),
        Value::Json(Json::String(text)) => text.chars().count(),
        Value::Catalog(catalog) => catalog.len(),
        other => return Err(unsupported("len", other)),
    };
    Ok(Value::Json(Json::from(len)))
}

fn keys(call: Call<'_>) -> Result<Value> {
    let input = call.input()?;
    let names: Vec<Json> = match input {
        Value::Json(Json::Object(map)) => map.keys().cloned().map(Json::String).collect(),
        Value::Catalog(catalog) => catalog.entry_names().into_iter().map(Json::String).collect(),
        other => return Err(unsupported("keys", other)),
    };
    Ok(Value::Json(Json::Array(names)))
}

fn values(call: Call<'_>) -> Result<Value> {
    match call.into_input()? {
        Value::Json(Json::Object(map)) => Ok(Value::Json(Json::Array(
            map.into_iter().map(|(_, value)| value).collect(),
        ))),
        other => Err(unsupported("values", &other)),
    }
}

fn is_empty(call: Call<'_>) -> Result<Value> {
    let input = call.input()?;
    let empty = match input {
        Value::Json(Json::Null) => true,
        Value::Json(Json::Array(items)) => items.is_empty(),
        Value::Json(Json::Object(map)) => map.is_empty(),
        Value::Json(Json::String(text)) => text.is_empty(),
        Value::Catalog(catalog) => catalog.is_empty(),
        other => return Err(unsupported("is_empty", other)),
    };
    Ok(Value::from(empty))
}

fn first(call: Call<'_>) -> Result<Value> {
    call.input()?.get_item(&Key::Index(0))
}

fn last(call: Call<'_>) -> Result<Value> {
    call.input()?.get_item(&Key::Index(-1))
}

fn to_string(call: Call<'_>) -> Result<Value> {
    let text = match call.input()? {
        Value::Json(Json::String(text)) => text.clone(),
        Value::Json(json) => serde_json::to_string(json)?,
        other => return Err(unsupported("to_string", other)),
    };
    Ok(Value::from(text))
}

#[cfg(test)]
mod tests {
    use datacat_core::Catalog;
    use serde_json::json;

    use super::*;
    use crate::transform::Kwargs;

    fn run(table: &MethodTable, name: &str, input: Value) -> Result<Value> {
        let kwargs = Kwargs::new();
        table.call(name, Call::new(1, Some(input), &[], &kwargs))
    }

    #[test]
    fn test_builtin_methods() {
        let table = MethodTable::builtin();
        let object = Value::Json(json!({"b": 2, "a": 1}));
        let array = Value::Json(json!([1, 2, 3]));

        assert_eq!(run(&table, "len", array.clone()).unwrap(), Value::Json(json!(3)));
        assert_eq!(run(&table, "keys", object.clone()).unwrap(), Value::Json(json!(["a", "b"])));
        assert_eq!(run(&table, "values", object).unwrap(), Value::Json(json!([1, 2])));
        assert_eq!(run(&table, "first", array.clone()).unwrap(), Value::Json(json!(1)));
        assert_eq!(run(&table, "last", array.clone()).unwrap(), Value::Json(json!(3)));
        assert_eq!(run(&table, "to_string", array).unwrap(), Value::from("[1,2,3]"));
        assert_eq!(run(&table, "is_empty", Value::Json(json!(""))).unwrap(), Value::from(true));
    }

    #[test]
    fn test_catalog_methods() {
        let table = MethodTable::builtin();
        let catalog = Value::Catalog(Catalog::new().with_entry("x", json!(1)));
        assert_eq!(run(&table, "len", catalog.clone()).unwrap(), Value::Json(json!(1)));
        assert_eq!(run(&table, "keys", catalog).unwrap(), Value::Json(json!(["x"])));
    }

    #[test]
    fn test_catalog_len_and_keys_agree_with_aliases() {
        let table = MethodTable::builtin();
        let catalog = Value::Catalog(
            Catalog::new()
                .with_entry("x", json!(1))
                .with_entry("y", json!(2))
                .with_alias("z", "x"),
        );
        assert_eq!(run(&table, "len", catalog.clone()).unwrap(), Value::Json(json!(2)));
        assert_eq!(run(&table, "keys", catalog).unwrap(), Value::Json(json!(["x", "y"])));
    }

    #[test]
    fn test_unknown_method_fails_at_call() {
        let table = MethodTable::empty();
        let err = run(&table, "explode", Value::from(1_i64)).unwrap_err();
        assert!(matches!(err, Error::UnknownMethod { ref name } if name == "explode"));
    }

    #[test]
    fn test_registered_method() {
        let mut table = MethodTable::empty();
        table.register("upper", |call: Call<'_>| {
            let text = call.into_input()?.into_json()?;
            Ok(Value::from(text.as_str().unwrap_or_default().to_uppercase()))
        });
        assert!(table.contains("upper"));
        assert_eq!(table.names(), vec!["upper"]);
        assert_eq!(run(&table, "upper", Value::from("abc")).unwrap(), Value::from("ABC"));
    }
}
