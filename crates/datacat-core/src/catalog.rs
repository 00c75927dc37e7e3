//! Catalogs: named collections of entries.
//!
//! A catalog maps entry names to values, typically readers describing how to
//! load each dataset. Entries can be held eagerly or resolved on demand
//! through a [`LazyEntries`] provider, for services where listing names is
//! cheap but describing each entry is not.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::TRACING_TARGET;
use crate::error::{Error, Result};
use crate::value::{Metadata, Value};

/// Entries resolved only when requested.
pub trait LazyEntries: std::fmt::Debug + Send + Sync {
    /// Returns the names of all entries without resolving them.
    fn names(&self) -> Vec<String>;

    /// Resolves a single entry.
    fn get(&self, name: &str) -> Result<Value>;
}

/// A catalog of named entries.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, Value>,
    lazy: Option<Arc<dyn LazyEntries>>,
    aliases: BTreeMap<String, String>,
    metadata: Metadata,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog backed by a lazy entry provider.
    pub fn from_lazy(entries: impl LazyEntries + 'static) -> Self {
        Self {
            lazy: Some(Arc::new(entries)),
            ..Self::default()
        }
    }

    /// Adds an entry.
    pub fn with_entry(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds an alias pointing at another entry.
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    /// Replaces the catalog metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Inserts an entry, returning the previous value under that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Returns every name [`get`](Self::get) accepts, aliases included,
    /// sorted and deduplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.entry_names().into_iter().collect();
        names.extend(self.aliases.keys().cloned());
        names.into_iter().collect()
    }

    /// Returns the entry names without aliases, sorted and deduplicated.
    pub fn entry_names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.entries.keys().cloned().collect();
        if let Some(lazy) = &self.lazy {
            names.extend(lazy.names());
        }
        names.into_iter().collect()
    }

    /// Returns whether an entry or alias with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
            || self.aliases.contains_key(name)
            || self
                .lazy
                .as_ref()
                .is_some_and(|lazy| lazy.names().iter().any(|n| n == name))
    }

    /// Looks up an entry by name or alias.
    pub fn get(&self, name: &str) -> Result<Value> {
        let target = self.aliases.get(name).map_or(name, String::as_str);

        if let Some(value) = self.entries.get(target) {
            return Ok(value.clone());
        }

        match &self.lazy {
            Some(lazy) if lazy.names().iter().any(|n| n == target) => {
                tracing::trace!(target: TRACING_TARGET, entry = target, "Resolving lazy catalog entry");
                lazy.get(target)
            }
            _ => Err(Error::key_not_found(name)),
        }
    }

    /// Returns the alias table.
    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Returns the catalog metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the number of entries, aliases excluded. Always equals
    /// `entry_names().len()`.
    pub fn len(&self) -> usize {
        self.entry_names().len()
    }

    /// Returns whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        let same_lazy = match (&self.lazy, &other.lazy) {
            (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (None, None) => true,
            _ => false,
        };

        same_lazy
            && self.entries == other.entries
            && self.aliases == other.aliases
            && self.metadata == other.metadata
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[derive(Debug, Default)]
    struct Numbers {
        resolved: AtomicUsize,
    }

    impl LazyEntries for Numbers {
        fn names(&self) -> Vec<String> {
            vec!["one".into(), "two".into()]
        }

        fn get(&self, name: &str) -> Result<Value> {
            self.resolved.fetch_add(1, Ordering::SeqCst);
            match name {
                "one" => Ok(Value::Json(json!(1))),
                "two" => Ok(Value::Json(json!(2))),
                other => Err(Error::key_not_found(other)),
            }
        }
    }

    #[test]
    fn test_eager_entries_and_aliases() {
        let catalog = Catalog::new()
            .with_entry("flights", json!({"rows": 3}))
            .with_alias("planes", "flights");

        assert_eq!(catalog.names(), vec!["flights", "planes"]);
        assert_eq!(catalog.entry_names(), vec!["flights"]);
        assert_eq!(catalog.len(), catalog.entry_names().len());
        assert_eq!(catalog.get("planes").unwrap(), catalog.get("flights").unwrap());
        assert!(matches!(catalog.get("trains"), Err(Error::KeyNotFound { .. })));
    }

    #[test]
    fn test_lazy_entries_resolve_on_demand() {
        let catalog = Catalog::from_lazy(Numbers::default()).with_entry("zero", json!(0));

        assert_eq!(catalog.names(), vec!["one", "two", "zero"]);
        assert!(catalog.contains("two"));
        assert_eq!(catalog.get("two").unwrap(), Value::Json(json!(2)));
        assert_eq!(catalog.get("zero").unwrap(), Value::Json(json!(0)));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_missing_lazy_entry_reports_requested_name() {
        let catalog = Catalog::from_lazy(Numbers::default()).with_alias("uno", "one");
        assert_eq!(catalog.get("uno").unwrap(), Value::Json(json!(1)));

        let err = catalog.get("three").unwrap_err();
        assert_eq!(err.to_string(), "key not found: three");
    }
}
