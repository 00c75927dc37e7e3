#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod catalog;
mod error;
mod output_type;
mod reader;
mod value;

pub use catalog::{Catalog, LazyEntries};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use output_type::OutputType;
pub use reader::{FnReader, Literal, Reader, ReaderRef};
pub use value::{Key, Metadata, Value};

/// Re-export of the structured data type carried by [`Value::Json`].
pub use serde_json::Value as Json;

/// Tracing target for catalog and reader operations.
pub const TRACING_TARGET: &str = "datacat_core";
