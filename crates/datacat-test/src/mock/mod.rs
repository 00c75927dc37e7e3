//! Mock readers for testing.
//!
//! Both readers are cheap to clone; clones share their state, so a test can
//! hand one clone to the code under test and inspect another.

mod counting;
mod failing;

pub use counting::CountingReader;
pub use failing::FailingReader;
