//! Materialized values and index keys.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use derive_more::From;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::reader::ReaderRef;

/// Metadata associated with readers and catalogs.
pub type Metadata = HashMap<String, Json>;

/// Key used to index into a materialized value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, From, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Mapping key or catalog entry name.
    Name(String),
    /// Sequence position; negative positions count from the end.
    Index(i64),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<i32> for Key {
    fn from(index: i32) -> Self {
        Self::Index(i64::from(index))
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A value produced by materializing a reader or pipeline.
#[derive(Debug, Clone, From)]
pub enum Value {
    /// Plain structured data.
    Json(Json),
    /// A catalog of named entries.
    Catalog(Catalog),
    /// A not-yet-materialized reader, typically a catalog entry.
    Reader(ReaderRef),
}

impl Value {
    /// Returns a short name for the kind of value.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json(Json::Null) => "null",
            Self::Json(Json::Bool(_)) => "bool",
            Self::Json(Json::Number(_)) => "number",
            Self::Json(Json::String(_)) => "string",
            Self::Json(Json::Array(_)) => "array",
            Self::Json(Json::Object(_)) => "object",
            Self::Catalog(_) => "catalog",
            Self::Reader(_) => "reader",
        }
    }

    /// Returns the JSON payload, if any.
    pub fn as_json(&self) -> Option<&Json> {
        match self {
            Self::Json(json) => Some(json),
            _ => None,
        }
    }

    /// Returns the catalog, if any.
    pub fn as_catalog(&self) -> Option<&Catalog> {
        match self {
            Self::Catalog(catalog) => Some(catalog),
            _ => None,
        }
    }

    /// Returns the reader, if any.
    pub fn as_reader(&self) -> Option<&ReaderRef> {
        match self {
            Self::Reader(reader) => Some(reader),
            _ => None,
        }
    }

    /// Consumes the value and returns its JSON payload.
    pub fn into_json(self) -> Result<Json> {
        match self {
            Self::Json(json) => Ok(json),
            other => Err(Error::InvalidArgument(format!(
                "expected structured data, found {}",
                other.kind()
            ))),
        }
    }

    /// Indexes into the value.
    ///
    /// Objects are indexed by name, arrays by position (negative positions
    /// count from the end) and catalogs by entry name or alias.
    pub fn get_item(&self, key: &Key) -> Result<Value> {
        match (self, key) {
            (Self::Json(Json::Object(map)), key) => {
                let name = key.to_string();
                map.get(&name)
                    .cloned()
                    .map(Value::Json)
                    .ok_or_else(|| Error::key_not_found(name))
            }
            (Self::Json(Json::Array(items)), Key::Index(index)) => {
                index_sequence(items, *index).cloned().map(Value::Json)
            }
            (Self::Json(Json::Array(items)), Key::Name(name)) => match name.parse::<i64>() {
                Ok(index) => index_sequence(items, index).cloned().map(Value::Json),
                Err(_) => Err(Error::NotIndexable {
                    value_kind: "array",
                    key: name.clone(),
                }),
            },
            (Self::Catalog(catalog), key) => catalog.get(&key.to_string()),
            (other, key) => Err(Error::NotIndexable {
                value_kind: other.kind(),
                key: key.to_string(),
            }),
        }
    }
}

fn index_sequence<T>(items: &[T], index: i64) -> Result<&T> {
    let len = items.len();
    let position = if index < 0 {
        i64::try_from(len).ok().map(|len| len + index)
    } else {
        Some(index)
    };

    position
        .and_then(|position| usize::try_from(position).ok())
        .and_then(|position| items.get(position))
        .ok_or(Error::IndexOutOfBounds { index, len })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Json(a), Self::Json(b)) => a == b,
            (Self::Catalog(a), Self::Catalog(b)) => a == b,
            (Self::Reader(a), Self::Reader(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Json(Json::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Json(Json::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Json(Json::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Json(Json::from(value))
    }
}
