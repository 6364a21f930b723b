//! Facade exposing the configuration entry points to the UI layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use folio_domain::{Item, RequestsConfig, UserPreferences};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::ConfigResult;
use crate::ports::{ConfigStorage, EventSink};
use crate::preferences_manager::PreferencesManager;
use crate::requests_manager::RequestsManager;

/// The only surface a UI binding layer talks to.
///
/// It never reads or writes the documents directly.
pub struct ConfigService<R, P> {
    requests: RequestsManager<R>,
    preferences: PreferencesManager<P>,
}

impl<R, P> ConfigService<R, P>
where
    R: ConfigStorage + 'static,
    P: ConfigStorage + 'static,
{
    /// Bundles the two managers.
    pub const fn new(requests: RequestsManager<R>, preferences: PreferencesManager<P>) -> Self {
        Self {
            requests,
            preferences,
        }
    }

    /// The request tree manager.
    pub const fn requests(&self) -> &RequestsManager<R> {
        &self.requests
    }

    /// The preferences manager.
    pub const fn preferences(&self) -> &PreferencesManager<P> {
        &self.preferences
    }

    /// Loads every document.
    ///
    /// # Errors
    ///
    /// Returns the first load failure.
    pub async fn load_all(&self) -> ConfigResult {
        self.requests.load().await?;
        self.preferences.load().await?;
        info!("all configuration loaded");
        Ok(())
    }

    /// Routes the events of every document to `sink`.
    pub fn connect(&self, sink: Arc<dyn EventSink>) {
        self.requests.connect(Arc::clone(&sink));
        self.preferences.connect(sink);
    }

    /// Persists every document immediately.
    ///
    /// # Errors
    ///
    /// Returns the first save failure.
    pub async fn save_all(&self) -> ConfigResult {
        self.requests.save().await?;
        self.preferences.save().await
    }

    /// Returns a copy of the request tree.
    pub async fn get_requests(&self) -> RequestsConfig {
        self.requests.get().await
    }

    /// Upserts request tree items.
    ///
    /// # Errors
    ///
    /// See [`RequestsManager::patch_values`].
    pub async fn set_requests_patch(&self, values: BTreeMap<String, Item>) -> ConfigResult {
        self.requests.patch_values(values).await
    }

    /// Adds a request under a folder.
    ///
    /// # Errors
    ///
    /// See [`RequestsManager::add_request`].
    pub async fn add_request(
        &self,
        parent_id: &str,
        name: &str,
        method: &str,
        path: &str,
    ) -> ConfigResult<String> {
        self.requests
            .add_request(parent_id, name, method, path)
            .await
    }

    /// Adds a folder under a folder.
    ///
    /// # Errors
    ///
    /// See [`RequestsManager::add_folder`].
    pub async fn add_folder(&self, parent_id: &str, name: &str) -> ConfigResult<String> {
        self.requests.add_folder(parent_id, name).await
    }

    /// Adds a root folder.
    ///
    /// # Errors
    ///
    /// See [`RequestsManager::add_root_folder`].
    pub async fn add_root_folder(&self, name: &str) -> ConfigResult<String> {
        self.requests.add_root_folder(name).await
    }

    /// Deletes an item and its subtree.
    ///
    /// # Errors
    ///
    /// See [`RequestsManager::delete_item`].
    pub async fn delete_item(&self, id: &str) -> ConfigResult {
        self.requests.delete_item(id).await
    }

    /// Renames an item.
    ///
    /// # Errors
    ///
    /// See [`RequestsManager::rename`].
    pub async fn rename_item(&self, id: &str, name: &str) -> ConfigResult {
        self.requests.rename(id, name).await
    }

    /// Replaces the root display order.
    ///
    /// # Errors
    ///
    /// See [`RequestsManager::reorder_roots`].
    pub async fn reorder_roots(&self, order: Vec<String>) -> ConfigResult {
        self.requests.reorder_roots(order).await
    }

    /// Returns a copy of the preferences.
    pub async fn get_preferences(&self) -> UserPreferences {
        self.preferences.get().await
    }

    /// Merges top-level preference fields.
    ///
    /// # Errors
    ///
    /// See [`PreferencesManager::patch`].
    pub async fn set_preferences_patch(&self, patch: Map<String, Value>) -> ConfigResult {
        self.preferences.patch(patch).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::ports::Clock;
    use crate::testing::{FixedClock, MemoryStorage, drain};
    use folio_domain::ThemeMode;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn service(storage: &MemoryStorage) -> ConfigService<MemoryStorage, MemoryStorage> {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
        ConfigService::new(
            RequestsManager::new(storage.clone(), "/data/requests.json", Arc::clone(&clock)),
            PreferencesManager::new(storage.clone(), "/data/config.json", clock),
        )
    }

    #[tokio::test]
    async fn test_entry_points_require_load() {
        let storage = MemoryStorage::new();
        let service = service(&storage);
        assert!(matches!(
            service.add_root_folder("API").await,
            Err(ConfigError::NotLoaded)
        ));
        assert!(matches!(service.save_all().await, Err(ConfigError::NotLoaded)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_routes_both_topics() {
        let storage = MemoryStorage::new();
        let service = service(&storage);
        service.load_all().await.unwrap();
        assert_eq!(storage.save_count(), 2);

        let (tx, mut rx) = mpsc::unbounded_channel();
        service.connect(Arc::new(tx));

        let api = service.add_root_folder("API").await.unwrap();
        let req = service
            .add_request(&api, "Status", "GET", "/status")
            .await
            .unwrap();
        service.rename_item(&req, "Health").await.unwrap();
        service
            .set_preferences_patch(json!({"theme": "auto"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let mut names: Vec<String> = drain(&mut rx).into_iter().map(|e| e.name).collect();
        // Both deferred saves share a deadline; their relative order is unspecified.
        names[4..].sort();
        assert_eq!(
            names,
            vec![
                "requests:updated",
                "requests:updated",
                "requests:updated",
                "config:updated",
                "config:saved",
                "requests:saved",
            ]
        );
        assert_eq!(service.get_requests().await.values[&req].name, "Health");
        assert_eq!(service.get_preferences().await.theme, ThemeMode::Auto);
    }

    #[tokio::test]
    async fn test_delete_and_reorder_through_facade() {
        let storage = MemoryStorage::new();
        let service = service(&storage);
        service.load_all().await.unwrap();

        let a = service.add_root_folder("A").await.unwrap();
        let b = service.add_root_folder("B").await.unwrap();
        let nested = service.add_folder(&a, "Nested").await.unwrap();
        service
            .reorder_roots(vec![b.clone(), a.clone()])
            .await
            .unwrap();
        service.delete_item(&a).await.unwrap();

        let config = service.get_requests().await;
        assert!(!config.values.contains_key(&nested));
        assert_eq!(config.root_order, vec![b]);

        service
            .set_requests_patch(BTreeMap::from([(
                "c".to_string(),
                Item::folder("C"),
            )]))
            .await
            .unwrap();
        assert_eq!(service.get_requests().await.ordered_roots().len(), 2);
        service.save_all().await.unwrap();
    }
}
