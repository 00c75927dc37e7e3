//! Dispatch configuration.

#[cfg(feature = "config")]
use clap::Args;
use datacat_core::{Error, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for the lazy dispatcher.
///
/// Defaults keep the permissive behavior: any unknown name falls back to a
/// deferred method call.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
#[must_use = "config does nothing unless you use it"]
pub struct DispatchConfig {
    /// Output types whose label contains this marker are catalogs.
    #[builder(default = "DEFAULT_CATALOG_MARKER.to_owned()")]
    #[cfg_attr(
        feature = "config",
        arg(long, env = "DATACAT_CATALOG_MARKER", default_value = DEFAULT_CATALOG_MARKER)
    )]
    pub catalog_marker: String,

    /// Whether unknown names may fall back to a generic method call.
    #[builder(default = "true")]
    #[cfg_attr(
        feature = "config",
        arg(long, env = "DATACAT_ALLOW_GENERIC_CALLS", default_value_t = true, action = clap::ArgAction::Set)
    )]
    pub allow_generic_calls: bool,

    /// When non-empty, the only method names the generic fallback accepts.
    #[builder(default)]
    #[cfg_attr(
        feature = "config",
        arg(long, env = "DATACAT_ALLOWED_METHODS", value_delimiter = ',')
    )]
    pub allowed_methods: Vec<String>,
}

/// Default catalog marker.
pub const DEFAULT_CATALOG_MARKER: &str = "Catalog";

impl DispatchConfig {
    /// Creates a builder.
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder::default()
    }

    /// Validates a configuration obtained without the builder.
    pub fn validate(&self) -> Result<()> {
        check_marker(&self.catalog_marker).map_err(Error::Configuration)
    }

    /// Returns whether the generic fallback may call `method`.
    pub fn permits_generic_call(&self, method: &str) -> bool {
        self.allow_generic_calls
            && (self.allowed_methods.is_empty() || self.allowed_methods.iter().any(|m| m == method))
    }
}

impl DispatchConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.catalog_marker {
            Some(marker) => check_marker(marker),
            None => Ok(()),
        }
    }
}

fn check_marker(marker: &str) -> Result<(), String> {
    if marker.trim().is_empty() {
        return Err("catalog_marker must not be empty".into());
    }
    Ok(())
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            catalog_marker: DEFAULT_CATALOG_MARKER.to_owned(),
            allow_generic_calls: true,
            allowed_methods: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        let built = DispatchConfig::builder().build().unwrap();
        assert_eq!(built, DispatchConfig::default());
        assert!(built.permits_generic_call("anything"));
    }

    #[test]
    fn test_builder_rejects_empty_marker() {
        let err = DispatchConfig::builder()
            .catalog_marker("  ")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("catalog_marker"));
    }

    #[test]
    fn test_allow_list() {
        let config = DispatchConfig::builder()
            .allowed_methods(vec!["len".to_owned()])
            .build()
            .unwrap();
        assert!(config.permits_generic_call("len"));
        assert!(!config.permits_generic_call("drop"));

        let closed = DispatchConfig::builder()
            .allow_generic_calls(false)
            .build()
            .unwrap();
        assert!(!closed.permits_generic_call("len"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DispatchConfig =
            serde_json::from_str(r#"{"catalog_marker": "Collection"}"#).unwrap();
        assert_eq!(config.catalog_marker, "Collection");
        assert!(config.allow_generic_calls);
        assert!(config.validate().is_ok());

        let invalid: DispatchConfig = serde_json::from_str(r#"{"catalog_marker": ""}"#).unwrap();
        assert!(matches!(invalid.validate(), Err(Error::Configuration(_))));
    }

    #[cfg(feature = "config")]
    #[derive(Debug, clap::Parser)]
    struct Cli {
        #[command(flatten)]
        dispatch: DispatchConfig,
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_cli_flags() {
        use clap::Parser;

        let defaults = Cli::try_parse_from(["datacat"]).unwrap();
        assert_eq!(defaults.dispatch, DispatchConfig::default());

        let cli = Cli::try_parse_from([
            "datacat",
            "--catalog-marker",
            "Collection",
            "--allow-generic-calls",
            "false",
            "--allowed-methods",
            "len,keys",
        ])
        .unwrap();
        assert_eq!(cli.dispatch.catalog_marker, "Collection");
        assert!(!cli.dispatch.allow_generic_calls);
        assert_eq!(cli.dispatch.allowed_methods, vec!["len", "keys"]);
        assert!(cli.dispatch.validate().is_ok());
    }
}
