//! Item identifier generation.

use uuid::Uuid;

/// Generates a fresh item identifier.
///
/// Identifiers are UUID v7 strings, so ids created later sort after
/// earlier ones.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}
