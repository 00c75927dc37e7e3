//! Prelude module for convenient imports.
//!
//! ```rust
//! use datacat_pipeline::prelude::*;
//! ```

pub use datacat_core::{Catalog, Error, Key, Literal, OutputType, Reader, Result, Value};

pub use crate::{
    Access, Args, Call, DispatchConfig, Dispatcher, Kwargs, Pipeline, Registry, Source, Step,
    Transform,
};
