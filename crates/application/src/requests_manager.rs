//! The request tree manager.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use folio_domain::{
    Item, MigrationError, RequestsConfig, ValidationError, ValidationResult, generate_id,
    migration, validation,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::events::EventBus;
use crate::patch::merge_values;
use crate::ports::{Clock, ConfigStorage, EventSink};
use crate::store::{ConfigStore, VersionedConfig};

impl VersionedConfig for RequestsConfig {
    const TOPIC: &'static str = "requests";

    fn initial() -> Self {
        Self::new()
    }

    fn migrate_document(self) -> Result<(Self, bool), MigrationError> {
        migration::migrate(self)
    }

    fn validate_document(&self) -> ValidationResult {
        validation::validate(self)
    }

    fn updated_payload(&self) -> serde_json::Result<Value> {
        let mut payload = Map::new();
        payload.insert("version".to_string(), self.version.into());
        payload.insert("values".to_string(), serde_json::to_value(&self.values)?);
        payload.insert("rootOrder".to_string(), self.root_order.clone().into());
        Ok(Value::Object(payload))
    }
}

/// Owns the request tree and exposes its mutation API.
///
/// Every mutation is validated against the whole proposed tree before it
/// is committed; a rejected mutation leaves the committed tree untouched.
pub struct RequestsManager<S> {
    store: ConfigStore<RequestsConfig, S>,
}

impl<S: ConfigStorage + 'static> RequestsManager<S> {
    /// Creates an unloaded manager for the document at `path`.
    pub fn new(storage: S, path: impl Into<std::path::PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: ConfigStore::new(storage, path, clock),
        }
    }

    /// Replaces the debounce window of deferred saves.
    #[must_use]
    pub fn with_debounce(self, delay: Duration) -> Self {
        Self {
            store: self.store.with_debounce(delay),
        }
    }

    /// Path of `requests.json`.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// The `requests` event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        self.store.events()
    }

    /// Connects the observer of `requests:*` events.
    pub fn connect(&self, sink: Arc<dyn EventSink>) {
        self.store.connect(sink);
    }

    /// Loads the tree, creating an empty one on first run.
    ///
    /// # Errors
    ///
    /// See [`ConfigStore::load`].
    pub async fn load(&self) -> ConfigResult {
        self.store.load().await
    }

    /// Returns a copy of the committed tree.
    pub async fn get(&self) -> RequestsConfig {
        self.store.get().await
    }

    /// Persists the committed tree immediately.
    ///
    /// # Errors
    ///
    /// See [`ConfigStore::save_now`].
    pub async fn save(&self) -> ConfigResult {
        self.store.save_now().await
    }

    /// Upserts whole items by id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotLoaded`] or [`ConfigError::Validation`].
    pub async fn patch_values(&self, values: BTreeMap<String, Item>) -> ConfigResult {
        let count = values.len();
        self.store
            .mutate(|current| Ok(Some(merge_values(current, values))))
            .await?;
        debug!(items = count, "request values patched");
        Ok(())
    }

    /// Adds a request under `parent_id` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the parent is missing or not a
    /// folder, or [`ConfigError::Validation`] if the new request is invalid.
    pub async fn add_request(
        &self,
        parent_id: &str,
        name: &str,
        method: &str,
        path: &str,
    ) -> ConfigResult<String> {
        self.add_child(parent_id, Item::request(name, method, path))
            .await
    }

    /// Adds an empty folder under `parent_id` and returns its id.
    ///
    /// # Errors
    ///
    /// Same as [`add_request`](Self::add_request).
    pub async fn add_folder(&self, parent_id: &str, name: &str) -> ConfigResult<String> {
        self.add_child(parent_id, Item::folder(name)).await
    }

    /// Adds a folder at root level, placed last in the root order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotLoaded`] or [`ConfigError::Validation`].
    pub async fn add_root_folder(&self, name: &str) -> ConfigResult<String> {
        let id = generate_id();
        self.store
            .mutate(|current| {
                let mut next = current.clone();
                next.root_order = current
                    .ordered_roots()
                    .into_iter()
                    .map(ToString::to_string)
                    .collect();
                next.root_order.push(id.clone());
                next.values.insert(id.clone(), Item::folder(name));
                Ok(Some(next))
            })
            .await?;
        debug!(id = %id, "root folder added");
        Ok(id)
    }

    /// Deletes an item, its whole subtree, and every reference to them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `id` does not exist.
    pub async fn delete_item(&self, id: &str) -> ConfigResult {
        let mut removed = 0;
        self.store
            .mutate(|current| {
                if current.get(id).is_none() {
                    return Err(ConfigError::NotFound(id.to_string()));
                }
                let doomed = current.subtree_ids(id);
                removed = doomed.len();

                let mut next = current.clone();
                next.values.retain(|key, _| !doomed.contains(key));
                for item in next.values.values_mut() {
                    item.children.retain(|child| !doomed.contains(child));
                }
                next.root_order.retain(|root| !doomed.contains(root));
                Ok(Some(next))
            })
            .await?;
        debug!(id, removed, "item deleted");
        Ok(())
    }

    /// Renames an item. Renaming to the current name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `id` does not exist, or
    /// [`ConfigError::Validation`] for an empty name.
    pub async fn rename(&self, id: &str, new_name: &str) -> ConfigResult {
        self.store
            .mutate(|current| {
                let item = current
                    .get(id)
                    .ok_or_else(|| ConfigError::NotFound(id.to_string()))?;
                if item.name == new_name {
                    return Ok(None);
                }
                let mut renamed = item.clone();
                renamed.name = new_name.to_string();
                let patch = BTreeMap::from([(id.to_string(), renamed)]);
                Ok(Some(merge_values(current, patch)))
            })
            .await?;
        Ok(())
    }

    /// Replaces the display order of root items.
    ///
    /// Roots not named in `order` keep the default ordering after it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if an entry is not an existing
    /// root item or appears twice.
    pub async fn reorder_roots(&self, order: Vec<String>) -> ConfigResult {
        self.store
            .mutate(|current| {
                check_root_order(current, &order)?;
                let mut next = current.clone();
                next.root_order = order;
                Ok(Some(next))
            })
            .await?;
        Ok(())
    }

    async fn add_child(&self, parent_id: &str, item: Item) -> ConfigResult<String> {
        let id = generate_id();
        self.store
            .mutate(|current| {
                let mut parent = current
                    .get(parent_id)
                    .filter(|parent| parent.is_folder())
                    .cloned()
                    .ok_or_else(|| ConfigError::NotFound(parent_id.to_string()))?;
                parent.children.push(id.clone());

                let mut next = current.clone();
                next.values.insert(parent_id.to_string(), parent);
                next.values.insert(id.clone(), item);
                Ok(Some(next))
            })
            .await?;
        debug!(id = %id, parent = parent_id, "item added");
        Ok(id)
    }
}

fn check_root_order(config: &RequestsConfig, order: &[String]) -> Result<(), ValidationError> {
    let roots: BTreeSet<&str> = config.root_ids().into_iter().collect();
    let mut seen = BTreeSet::new();
    for id in order {
        if !roots.contains(id.as_str()) {
            return Err(ValidationError::InvalidRootOrder { id: id.clone() });
        }
        if !seen.insert(id.as_str()) {
            return Err(ValidationError::DuplicateRootOrder { id: id.clone() });
        }
    }
    Ok(())
}
