//! Shared fixtures.

use std::sync::Arc;

use datacat_core::{Catalog, Literal, Metadata, Value};
use serde_json::json;

/// Builds a small catalog.
///
/// Entries: `numbers` (a JSON array), `settings` (a JSON object) and
/// `frame` (a nested reader of type `pkg:DataFrame`). The alias `nums`
/// points at `numbers`.
pub fn sample_catalog() -> Catalog {
    let frame = Literal::new("pkg:DataFrame", json!([{"x": 1}, {"x": 2}]));

    Catalog::new()
        .with_entry("numbers", json!([1, 2, 3]))
        .with_entry("settings", json!({"precision": 2}))
        .with_entry("frame", Value::Reader(Arc::new(frame)))
        .with_alias("nums", "numbers")
        .with_metadata(Metadata::from([("origin".to_owned(), json!("fixture"))]))
}
