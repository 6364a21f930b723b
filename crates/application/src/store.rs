//! Generic versioned document store.
//!
//! [`ConfigStore`] owns one committed document behind a read/write lock.
//! Mutations take the write lock, validate the proposed document, commit
//! it, publish `topic:updated` and schedule a debounced save. The deferred
//! save re-takes the write lock and writes whatever is committed at that
//! moment, so edits made while the timer is pending are never lost.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use folio_domain::{MigrationError, ValidationResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::debounce::Debouncer;
use crate::error::{ConfigError, ConfigResult};
use crate::events::EventBus;
use crate::ports::{Clock, ConfigStorage, EventSink, StorageError};

/// A document kind that a [`ConfigStore`] can manage.
pub trait VersionedConfig: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Event topic, used as the `topic:` prefix of every event name.
    const TOPIC: &'static str;

    /// The document written on first run.
    fn initial() -> Self;

    /// Upgrades a stored document to the current schema.
    ///
    /// Returns the document and whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] for versions with no upgrade path.
    fn migrate_document(self) -> Result<(Self, bool), MigrationError>;

    /// Checks every invariant of the document.
    ///
    /// # Errors
    ///
    /// Returns the first violation.
    fn validate_document(&self) -> ValidationResult;

    /// Payload of the `topic:updated` event.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the document cannot be encoded.
    fn updated_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

struct Shared<T, S> {
    state: RwLock<Option<T>>,
    storage: S,
    path: PathBuf,
    events: EventBus,
    clock: Arc<dyn Clock>,
}

impl<T: VersionedConfig, S: ConfigStorage> Shared<T, S> {
    /// Writes the committed document and reports the outcome as an event.
    async fn persist(&self) {
        let state = self.state.write().await;
        let Some(config) = state.as_ref() else {
            return;
        };
        match self.storage.save(&self.path, config).await {
            Ok(()) => {
                debug!(topic = T::TOPIC, path = %self.path.display(), "configuration saved");
                self.events.saved(self.clock.now(), &self.path);
            }
            Err(err) => {
                warn!(topic = T::TOPIC, error = %err, "deferred save failed");
                self.events.error(&err);
            }
        }
    }
}

/// Owns one committed document and its persistence schedule.
pub struct ConfigStore<T, S> {
    shared: Arc<Shared<T, S>>,
    debouncer: Debouncer,
}

impl<T, S> ConfigStore<T, S>
where
    T: VersionedConfig,
    S: ConfigStorage + 'static,
{
    /// Creates an unloaded store for the document at `path`.
    pub fn new(storage: S, path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(None),
                storage,
                path: path.into(),
                events: EventBus::new(T::TOPIC),
                clock,
            }),
            debouncer: Debouncer::default(),
        }
    }

    /// Replaces the debounce window.
    #[must_use]
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debouncer = Debouncer::new(delay);
        self
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// The event bus for this document's topic.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Connects the observer that receives this store's events.
    pub fn connect(&self, sink: Arc<dyn EventSink>) {
        self.shared.events.connect(sink);
    }

    /// Returns true once a load has succeeded.
    pub async fn is_loaded(&self) -> bool {
        self.shared.state.read().await.is_some()
    }

    /// Loads, migrates and validates the stored document, then commits it.
    ///
    /// A missing document is replaced by [`VersionedConfig::initial`],
    /// which is persisted immediately. A migrated document is written back
    /// best effort.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Storage`], [`ConfigError::Migration`] or
    /// [`ConfigError::Validation`]. The committed state is unchanged on error.
    pub async fn load(&self) -> ConfigResult {
        let shared = &self.shared;
        let mut state = shared.state.write().await;

        let Some(stored) = shared.storage.load::<T>(&shared.path).await? else {
            let initial = T::initial();
            shared.storage.save(&shared.path, &initial).await?;
            info!(topic = T::TOPIC, path = %shared.path.display(), "created new configuration");
            *state = Some(initial);
            return Ok(());
        };

        let (config, migrated) = stored.migrate_document()?;
        config.validate_document()?;

        if migrated {
            info!(topic = T::TOPIC, "configuration migrated to current schema");
            if let Err(err) = shared.storage.save(&shared.path, &config).await {
                warn!(topic = T::TOPIC, error = %err, "failed to persist migrated configuration");
            }
        }

        info!(topic = T::TOPIC, path = %shared.path.display(), "configuration loaded");
        *state = Some(config);
        Ok(())
    }

    /// Returns a copy of the committed document.
    ///
    /// Before a successful load this is [`VersionedConfig::initial`].
    pub async fn get(&self) -> T {
        self.shared
            .state
            .read()
            .await
            .clone()
            .unwrap_or_else(T::initial)
    }

    /// Proposes a new document derived from the committed one.
    ///
    /// `propose` returns `Ok(None)` to leave the state untouched. A proposed
    /// document is validated in full before it replaces the committed one.
    /// Returns whether a new document was committed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotLoaded`] before a successful load, the
    /// error from `propose`, [`ConfigError::Validation`], or
    /// [`ConfigError::Storage`] if the document does not encode. Nothing is
    /// committed on error.
    pub async fn mutate<F>(&self, propose: F) -> ConfigResult<bool>
    where
        F: FnOnce(&T) -> ConfigResult<Option<T>>,
    {
        let mut state = self.shared.state.write().await;
        let current = state.as_ref().ok_or(ConfigError::NotLoaded)?;

        let Some(next) = propose(current)? else {
            return Ok(false);
        };
        if let Err(err) = next.validate_document() {
            debug!(topic = T::TOPIC, rule = err.rule(), error = %err, "mutation rejected");
            return Err(err.into());
        }

        // A document that cannot be encoded could never be saved either.
        let payload = next.updated_payload().map_err(|err| {
            warn!(topic = T::TOPIC, error = %err, "mutation rejected: document does not encode");
            StorageError::Encode(err.to_string())
        })?;
        *state = Some(next);
        debug!(topic = T::TOPIC, "mutation committed");
        self.shared.events.updated(payload);
        self.schedule_save();
        drop(state);
        Ok(true)
    }

    /// Writes the committed document now, bypassing the debounce window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotLoaded`] before a successful load, or
    /// [`ConfigError::Storage`] if the write fails.
    pub async fn save_now(&self) -> ConfigResult {
        let shared = &self.shared;
        let state = shared.state.write().await;
        let config = state.as_ref().ok_or(ConfigError::NotLoaded)?;

        shared.storage.save(&shared.path, config).await?;
        // The pending write would store the same document again. Cancel it
        // before releasing the lock so a commit queued behind this save keeps
        // its own deferred write.
        self.debouncer.cancel();
        drop(state);

        shared.events.saved(shared.clock.now(), &shared.path);
        Ok(())
    }

    fn schedule_save(&self) {
        let shared = Arc::clone(&self.shared);
        self.debouncer
            .schedule(move || async move { shared.persist().await });
    }
}
