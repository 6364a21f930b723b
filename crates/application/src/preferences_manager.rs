//! The user preferences manager.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use folio_domain::{MigrationError, UserPreferences, ValidationResult};
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::events::EventBus;
use crate::patch::merge_json;
use crate::ports::{Clock, ConfigStorage, EventSink};
use crate::store::{ConfigStore, VersionedConfig};

impl VersionedConfig for UserPreferences {
    const TOPIC: &'static str = "config";

    fn initial() -> Self {
        Self::default()
    }

    fn migrate_document(self) -> Result<(Self, bool), MigrationError> {
        self.migrate()
    }

    fn validate_document(&self) -> ValidationResult {
        self.validate()
    }
}

/// Owns the user preferences document.
pub struct PreferencesManager<S> {
    store: ConfigStore<UserPreferences, S>,
}

impl<S: ConfigStorage + 'static> PreferencesManager<S> {
    /// Creates an unloaded manager for the document at `path`.
    pub fn new(storage: S, path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
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

    /// Path of `config.json`.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// The `config` event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        self.store.events()
    }

    /// Connects the observer of `config:*` events.
    pub fn connect(&self, sink: Arc<dyn EventSink>) {
        self.store.connect(sink);
    }

    /// Loads preferences, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// See [`ConfigStore::load`].
    pub async fn load(&self) -> ConfigResult {
        self.store.load().await
    }

    /// Returns a copy of the current preferences.
    pub async fn get(&self) -> UserPreferences {
        self.store.get().await
    }

    /// Persists the current preferences immediately.
    ///
    /// # Errors
    ///
    /// See [`ConfigStore::save_now`].
    pub async fn save(&self) -> ConfigResult {
        self.store.save_now().await
    }

    /// Overwrites the top-level fields named in `patch`.
    ///
    /// The version field is never taken from the patch.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPatch`] if a field has the wrong
    /// shape and [`ConfigError::Validation`] if a value is out of range.
    pub async fn patch(&self, patch: Map<String, Value>) -> ConfigResult {
        self.store
            .mutate(|current| {
                let mut merged = merge_json(current, &patch)
                    .map_err(|e| ConfigError::InvalidPatch(e.to_string()))?;
                merged.version = current.version;
                Ok(Some(merged))
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{FixedClock, MemoryStorage, collect_events, drain};
    use folio_domain::ThemeMode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PATH: &str = "/data/config.json";

    async fn loaded() -> (PreferencesManager<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::new();
        let manager =
            PreferencesManager::new(storage.clone(), PATH, Arc::new(FixedClock::default()));
        manager.load().await.unwrap();
        (manager, storage)
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_first_load_writes_defaults() {
        let (manager, storage) = loaded().await;
        assert_eq!(manager.get().await, UserPreferences::default());
        assert_eq!(
            storage.stored::<UserPreferences>(PATH),
            Some(UserPreferences::default())
        );
    }

    #[tokio::test]
    async fn test_patch_merges_fields_and_keeps_version() {
        let (manager, _) = loaded().await;
        manager
            .patch(object(json!({"theme": "dark", "baseURL": "https://api.test", "version": 99})))
            .await
            .unwrap();

        let prefs = manager.get().await;
        assert_eq!(prefs.theme, ThemeMode::Dark);
        assert_eq!(prefs.base_url, "https://api.test");
        assert_eq!(prefs.font_size, 14);
        assert_eq!(prefs.version, 1);
    }

    #[tokio::test]
    async fn test_patch_with_wrong_shape_is_rejected() {
        let (manager, _) = loaded().await;
        let err = manager
            .patch(object(json!({"fontSize": "large"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPatch(_)));
        assert_eq!(manager.get().await, UserPreferences::default());
    }

    #[tokio::test]
    async fn test_patch_out_of_range_is_rejected() {
        let (manager, _) = loaded().await;
        let err = manager
            .patch(object(json!({"fontSize": 4})))
            .await
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().rule(), "out_of_range");
        assert_eq!(manager.get().await.font_size, 14);
    }

    #[tokio::test(start_paused = true)]
    async fn test_patch_emits_config_events() {
        let (manager, storage) = loaded().await;
        let mut rx = collect_events(manager.events());

        manager.patch(object(json!({"fontSize": 18}))).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let names: Vec<String> = drain(&mut rx).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["config:updated", "config:saved"]);
        assert_eq!(storage.stored::<UserPreferences>(PATH).unwrap().font_size, 18);
    }
}
