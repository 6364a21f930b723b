//! Deterministic JSON serialization for the configuration documents.
//!
//! Output is stable across saves:
//! - object keys in sorted order (via `BTreeMap` in domain types)
//! - 2-space indentation
//! - trailing newline
//! - UTF-8 without BOM

mod json;

pub use json::*;
