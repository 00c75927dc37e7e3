//! Output type labels.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Label naming the semantic kind of value a reader produces.
///
/// Labels are opaque strings such as `"pandas:DataFrame"` or
/// `"datacat:Catalog"`. They are only ever compared and searched, never
/// resolved to a concrete Rust type. The empty label means "not known until
/// executed".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputType(String);

impl OutputType {
    /// Creates a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the unresolved label.
    pub fn unknown() -> Self {
        Self(String::new())
    }

    /// Returns the label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the label is resolved.
    pub fn is_known(&self) -> bool {
        !self.0.is_empty()
    }

    /// Returns whether the label denotes a catalog kind, i.e. contains `marker`.
    pub fn is_catalog(&self, marker: &str) -> bool {
        !marker.is_empty() && self.0.contains(marker)
    }
}

impl AsRef<str> for OutputType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OutputType {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for OutputType {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl From<&OutputType> for OutputType {
    fn from(label: &OutputType) -> Self {
        label.clone()
    }
}

impl PartialEq<str> for OutputType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for OutputType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_marker() {
        assert!(OutputType::new("datacat:Catalog").is_catalog("Catalog"));
        assert!(OutputType::new("thredds:THREDDSCatalog").is_catalog("Catalog"));
        assert!(!OutputType::new("pandas:DataFrame").is_catalog("Catalog"));
        assert!(!OutputType::new("datacat:Catalog").is_catalog(""));
    }

    #[test]
    fn test_unknown() {
        let unknown = OutputType::unknown();
        assert!(!unknown.is_known());
        assert!(!unknown.is_catalog("Catalog"));
        assert_eq!(OutputType::from("a:B"), "a:B");
    }
}
