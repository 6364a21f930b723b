//! Partial-update merging.
//!
//! Both merges build a new value and never touch `current`.

use std::collections::BTreeMap;

use folio_domain::{Item, RequestsConfig};
use serde::Serialize;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::{Map, Value};

/// Upserts `patch` into a copy of `current.values`.
///
/// Keys absent from the patch are untouched. The version and root order
/// of `current` are kept.
#[must_use]
pub fn merge_values(current: &RequestsConfig, patch: BTreeMap<String, Item>) -> RequestsConfig {
    let mut merged = current.clone();
    merged.values.extend(patch);
    merged
}

/// Overwrites the top-level fields of `current` named in `patch`.
///
/// Fields unknown to `T` survive when `T` keeps a flattened catch-all map.
///
/// # Errors
///
/// Returns an error if `current` is not a JSON object or the merged object
/// no longer decodes as `T`.
pub fn merge_json<T>(current: &T, patch: &Map<String, Value>) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let Value::Object(mut fields) = serde_json::to_value(current)? else {
        return Err(serde_json::Error::custom("document is not a JSON object"));
    };
    for (key, value) in patch {
        fields.insert(key.clone(), value.clone());
    }
    serde_json::from_value(Value::Object(fields))
}
