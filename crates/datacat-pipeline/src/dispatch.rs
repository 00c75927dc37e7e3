//! Lazy dispatch over readers and pipelines.
//!
//! The [`Dispatcher`] decides, for every attribute or item requested on a
//! [`Source`], whether to extend a pipeline, read the source right away,
//! hand out a namespace or defer a generic method call. The decision is
//! made by [`Dispatcher::resolve`] and depends only on the request, the
//! registry and the label of the source's current output type.

use std::collections::BTreeSet;
use std::sync::Arc;

use datacat_core::{Error, Key, OutputType, Result, Value};
use strum::{AsRefStr, IntoStaticStr};

use crate::TRACING_TARGET_DISPATCH;
use crate::config::DispatchConfig;
use crate::functioner::Functioner;
use crate::namespace::{Namespace, NamespaceProvider, NoNamespaces};
use crate::pipeline::Pipeline;
use crate::registry::Registry;
use crate::source::Source;
use crate::step::{Operation, Step};
use crate::transform::{Args, Kwargs, Transform};

/// Members every source exposes regardless of its output type.
///
/// `read`, `output_type` and `metadata` are methods of [`Source`]; `apply`
/// and `transform` are methods of [`Dispatcher`]. They are listed by
/// [`Dispatcher::dir`] but never dispatched as attributes.
pub const NATIVE_MEMBERS: &[&str] = &["apply", "metadata", "output_type", "read", "transform"];

/// How a name was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AccessKind {
    /// `source.name`
    Attribute,
    /// `source[name]`
    Item,
}

/// Outcome of resolving a request, in priority order.
#[derive(Debug, Clone, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Dispatch {
    /// Append a step to a pipeline without reading anything.
    AppendStep,
    /// Read the source now and index the result.
    Materialize,
    /// Return the namespace registered under the requested name.
    ReturnNamespace(Namespace),
    /// Defer a call of the requested method on the materialized value.
    GenericCall,
}

/// Result of an attribute or item access.
#[derive(Debug, Clone)]
pub enum Access {
    /// A deferred pipeline.
    Pipeline(Pipeline),
    /// A value produced by reading a catalog.
    Value(Value),
    /// A namespace bound to the source.
    Namespace(Namespace),
}

impl Access {
    /// Returns the pipeline, if the access was deferred.
    pub fn as_pipeline(&self) -> Option<&Pipeline> {
        match self {
            Self::Pipeline(pipeline) => Some(pipeline),
            _ => None,
        }
    }

    /// Returns the value, if the access materialized a catalog.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the namespace, if one was requested.
    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    /// Converts the access into a pipeline.
    pub fn into_pipeline(self) -> Option<Pipeline> {
        match self {
            Self::Pipeline(pipeline) => Some(pipeline),
            _ => None,
        }
    }

    /// Converts the access into a value.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Routes attribute, item and call requests on sources.
///
/// Holds the registry, namespace provider and configuration by reference so
/// the dispatcher itself is cheap to clone and share.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    namespaces: Arc<dyn NamespaceProvider>,
    config: Arc<DispatchConfig>,
}

impl Dispatcher {
    /// Creates a dispatcher without namespaces and with default configuration.
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    /// Creates a dispatcher with the given configuration.
    pub fn with_config(registry: impl Into<Arc<Registry>>, config: DispatchConfig) -> Self {
        let config = Arc::new(config);
        tracing::debug!(
            target: TRACING_TARGET_DISPATCH,
            catalog_marker = %config.catalog_marker,
            allow_generic_calls = config.allow_generic_calls,
            allowed_methods = config.allowed_methods.len(),
            "Dispatcher created"
        );

        Self {
            registry: registry.into(),
            namespaces: Arc::new(NoNamespaces),
            config,
        }
    }

    /// Replaces the namespace provider.
    pub fn with_namespaces(mut self, provider: impl NamespaceProvider + 'static) -> Self {
        self.namespaces = Arc::new(provider);
        self
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Returns whether `output_type` selects the catalog regime.
    pub fn is_catalog(&self, output_type: &OutputType) -> bool {
        output_type.is_catalog(&self.config.catalog_marker)
    }

    /// Returns a functioner bound to `source` and to the transformations
    /// registered for its current output type.
    pub fn transform(&self, source: &Source) -> Functioner {
        let funcdict = self.registry.convert_classes(&source.output_type());
        Functioner::new(
            source.clone(),
            funcdict,
            self.registry.methods(),
            Arc::clone(&self.config),
        )
    }

    /// Decides how a request for `name` on `source` is served.
    ///
    /// Attributes are tried against, in order: the transformation names of
    /// the source's functioner, the catalog regime, the namespaces and
    /// finally the generic method call. Native member names are rejected
    /// with [`Error::NativeMember`]. Items materialize in the catalog regime
    /// and otherwise append a get-item step.
    pub fn resolve(&self, source: &Source, name: &str, access: AccessKind) -> Result<Dispatch> {
        if access == AccessKind::Attribute && NATIVE_MEMBERS.contains(&name) {
            return Err(Error::NativeMember {
                name: name.to_owned(),
            });
        }

        let output_type = source.output_type();

        let dispatch = match access {
            AccessKind::Item if self.is_catalog(&output_type) => Dispatch::Materialize,
            AccessKind::Item => Dispatch::AppendStep,
            AccessKind::Attribute => {
                if self.transform(source).contains(name) {
                    Dispatch::AppendStep
                } else if self.is_catalog(&output_type) {
                    Dispatch::Materialize
                } else {
                    match self.namespaces.namespaces(source)?.remove(name) {
                        Some(namespace) => Dispatch::ReturnNamespace(namespace),
                        None => Dispatch::GenericCall,
                    }
                }
            }
        };

        tracing::trace!(
            target: TRACING_TARGET_DISPATCH,
            name,
            access = access.as_ref(),
            output_type = %output_type,
            dispatch = <&'static str>::from(&dispatch),
            "Resolved access"
        );
        Ok(dispatch)
    }

    /// Attribute access on `source`.
    ///
    /// A catalog-typed source is read once and indexed by `name`; everything
    /// else builds a pipeline or returns a namespace without reading.
    pub fn attr(&self, source: &Source, name: &str) -> Result<Access> {
        match self.resolve(source, name, AccessKind::Attribute)? {
            Dispatch::AppendStep | Dispatch::GenericCall => {
                self.transform(source).attr(name).map(Access::Pipeline)
            }
            Dispatch::Materialize => self.materialize(source, &Key::Name(name.to_owned())),
            Dispatch::ReturnNamespace(namespace) => Ok(Access::Namespace(namespace)),
        }
    }

    /// Item access on `source`.
    ///
    /// A catalog-typed source is read once and indexed by `key`; otherwise a
    /// get-item step is appended, keeping the source's output type.
    pub fn item(&self, source: &Source, key: impl Into<Key>) -> Result<Access> {
        let key = key.into();
        match self.resolve(source, &key.to_string(), AccessKind::Item)? {
            Dispatch::Materialize => self.materialize(source, &key),
            _ => {
                let step = Step::new(Operation::GetItem(key));
                Ok(Access::Pipeline(source.with_step(step, source.output_type())))
            }
        }
    }

    /// Builds a pipeline applying `func` to the output of `source`.
    ///
    /// Always deferred, including for catalog-typed sources. The declared
    /// output type defaults to the source's own.
    pub fn apply(
        &self,
        source: &Source,
        func: Transform,
        args: Args,
        kwargs: Kwargs,
        output_type: Option<OutputType>,
    ) -> Pipeline {
        let output_type = output_type.unwrap_or_else(|| source.output_type());
        let step = Step::new(Operation::Apply(func))
            .with_args(args)
            .with_kwargs(kwargs);
        source.with_step(step, output_type)
    }

    /// Lists the names accessible on `source`, sorted and deduplicated.
    ///
    /// Never reads the source and never fails; a failing namespace provider
    /// contributes no names.
    pub fn dir(&self, source: &Source) -> Vec<String> {
        let mut names: BTreeSet<String> = NATIVE_MEMBERS.iter().map(|&name| name.to_owned()).collect();
        names.extend(self.transform(source).dir().into_iter().map(str::to_owned));

        match self.namespaces.namespaces(source) {
            Ok(namespaces) => names.extend(namespaces.into_keys()),
            Err(error) => tracing::debug!(
                target: TRACING_TARGET_DISPATCH,
                %error,
                "Namespace lookup failed during enumeration"
            ),
        }

        names.into_iter().collect()
    }

    /// Returns the documentation registered for the source's output type.
    pub fn output_doc(&self, source: &Source) -> Option<String> {
        self.registry
            .output_doc(&source.output_type())
            .map(str::to_owned)
    }

    fn materialize(&self, source: &Source, key: &Key) -> Result<Access> {
        tracing::debug!(
            target: TRACING_TARGET_DISPATCH,
            %key,
            output_type = %source.output_type(),
            "Reading catalog to resolve access"
        );
        source.read()?.get_item(key).map(Access::Value)
    }
}
