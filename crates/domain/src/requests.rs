//! The request tree aggregate (requests.json).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::item::Item;

/// Current schema version of the requests document.
pub const CURRENT_VERSION: u32 = 2;

/// File name of the requests document inside the data directory.
pub const REQUESTS_FILE_NAME: &str = "requests.json";

/// Root aggregate: every item of the tree, flattened and keyed by id.
///
/// `values` is a `BTreeMap` so keys serialize in sorted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestsConfig {
    /// Schema version. Missing on legacy files, which load as 0.
    #[serde(default)]
    pub version: u32,

    /// All items by id.
    #[serde(default)]
    pub values: BTreeMap<String, Item>,

    /// Display order of root items.
    #[serde(default, rename = "rootOrder", skip_serializing_if = "Vec::is_empty")]
    pub root_order: Vec<String>,

    /// Top-level fields this version does not model.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RequestsConfig {
    /// Creates an empty tree at the current schema version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            values: BTreeMap::new(),
            root_order: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Adds an item, replacing any previous value under the same id.
    #[must_use]
    pub fn with_item(mut self, id: impl Into<String>, item: Item) -> Self {
        self.values.insert(id.into(), item);
        self
    }

    /// Sets the root display order.
    #[must_use]
    pub fn with_root_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.root_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.values.get(id)
    }

    /// Every id that appears in some item's children.
    #[must_use]
    pub fn referenced_ids(&self) -> BTreeSet<&str> {
        self.values
            .values()
            .flat_map(|item| item.children.iter().map(String::as_str))
            .collect()
    }

    /// Ids of items that no other item references, in key order.
    #[must_use]
    pub fn root_ids(&self) -> Vec<&str> {
        let referenced = self.referenced_ids();
        self.values
            .keys()
            .map(String::as_str)
            .filter(|id| !referenced.contains(id))
            .collect()
    }

    /// Root ids in display order.
    ///
    /// Entries of `root_order` that are still roots come first; the
    /// remaining roots follow, sorted by name and then id.
    #[must_use]
    pub fn ordered_roots(&self) -> Vec<&str> {
        let roots: BTreeSet<&str> = self.root_ids().into_iter().collect();
        let mut seen = BTreeSet::new();
        let mut ordered: Vec<&str> = self
            .root_order
            .iter()
            .map(String::as_str)
            .filter(|id| roots.contains(id) && seen.insert(*id))
            .collect();

        let mut rest: Vec<&str> = roots.into_iter().filter(|id| !seen.contains(id)).collect();
        rest.sort_by(|a, b| self.display_key(a).cmp(&self.display_key(b)));
        ordered.extend(rest);
        ordered
    }

    /// Sort key for the default ordering of roots.
    fn display_key<'a>(&'a self, id: &'a str) -> (&'a str, &'a str) {
        let name = self.values.get(id).map_or("", |item| item.name.as_str());
        (name, id)
    }

    /// The item itself plus, for folders, every transitive descendant.
    ///
    /// Safe on cyclic input: each id is visited once.
    #[must_use]
    pub fn subtree_ids(&self, id: &str) -> BTreeSet<String> {
        let mut collected = BTreeSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if !collected.insert(current.clone()) {
                continue;
            }
            if let Some(item) = self.values.get(&current) {
                stack.extend(item.children.iter().cloned());
            }
        }
        collected
    }

    /// Total number of request items.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.values.values().filter(|item| item.is_request()).count()
    }
}

impl Default for RequestsConfig {
    fn default() -> Self {
        Self::new()
    }
}
