#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod fixture;
mod mock;
mod telemetry;

pub use fixture::sample_catalog;
pub use mock::{CountingReader, FailingReader};
pub use telemetry::init_tracing;
