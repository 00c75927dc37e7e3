#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod dispatch;
mod functioner;
mod methods;
mod namespace;
mod pipeline;
mod registry;
mod source;
mod step;
mod transform;

#[doc(hidden)]
pub mod prelude;

pub use config::{DEFAULT_CATALOG_MARKER, DispatchConfig, DispatchConfigBuilder};
pub use dispatch::{Access, AccessKind, Dispatch, Dispatcher, NATIVE_MEMBERS};
pub use functioner::Functioner;
pub use methods::MethodTable;
pub use namespace::{Namespace, NamespaceProvider, NamespaceTable, NoNamespaces};
pub use pipeline::Pipeline;
pub use registry::{FuncDict, Registry};
pub use source::Source;
pub use step::{Operation, Step};
pub use transform::{Args, Call, Kwargs, Transform};

/// Tracing target for pipeline construction and execution.
pub const TRACING_TARGET_PIPELINE: &str = "datacat_pipeline::pipeline";

/// Tracing target for dispatch decisions.
pub const TRACING_TARGET_DISPATCH: &str = "datacat_pipeline::dispatch";
