//! Primary storage with an optional mirrored secondary.
//!
//! The primary (local files) is authoritative. A secondary backend is
//! consulted only on load, where a [`ConflictResolver`] settles any
//! difference; on save it receives a best-effort copy.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use folio_application::ports::{ConfigStorage, StorageError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of a load-time conflict between primary and secondary data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Use the primary document.
    #[default]
    KeepLocal,
    /// Use the secondary document.
    KeepRemote,
    /// Overlay the secondary's top-level fields onto the primary's.
    Merge,
}

/// Decides how to reconcile differing documents.
pub trait ConflictResolver: Send + Sync {
    /// Picks a resolution for one conflicting document.
    fn resolve(&self, local: &Value, remote: &Value) -> Resolution;
}

/// A fixed policy.
impl ConflictResolver for Resolution {
    fn resolve(&self, _local: &Value, _remote: &Value) -> Resolution {
        *self
    }
}

/// [`ConfigStorage`] that composes a primary and an optional secondary.
pub struct StorageCoordinator<P, S> {
    primary: P,
    secondary: Option<S>,
    resolver: Arc<dyn ConflictResolver>,
}

impl<P: ConfigStorage, S: ConfigStorage> StorageCoordinator<P, S> {
    /// Creates a coordinator. With no secondary it behaves exactly like
    /// `primary`.
    pub fn new(primary: P, secondary: Option<S>, resolver: Arc<dyn ConflictResolver>) -> Self {
        Self {
            primary,
            secondary,
            resolver,
        }
    }

    /// Returns true if a secondary backend is attached.
    pub const fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    fn reconcile(&self, path: &Path, local: Value, remote: Value) -> Value {
        let resolution = self.resolver.resolve(&local, &remote);
        debug!(path = %path.display(), ?resolution, "storage conflict resolved");
        match resolution {
            Resolution::KeepLocal => local,
            Resolution::KeepRemote => remote,
            Resolution::Merge => merge_top_level(local, remote),
        }
    }
}

fn merge_top_level(local: Value, remote: Value) -> Value {
    match (local, remote) {
        (Value::Object(mut fields), Value::Object(remote_fields)) => {
            fields.extend(remote_fields);
            Value::Object(fields)
        }
        (local, _) => local,
    }
}

impl<P, S> ConfigStorage for StorageCoordinator<P, S>
where
    P: ConfigStorage,
    S: ConfigStorage,
{
    async fn load<T>(&self, path: &Path) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        let Some(local) = self.primary.load::<Value>(path).await? else {
            return Ok(None);
        };

        let chosen = match &self.secondary {
            None => local,
            Some(secondary) => match secondary.load::<Value>(path).await {
                Ok(Some(remote)) if remote != local => self.reconcile(path, local, remote),
                Ok(_) => local,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "secondary load failed, using local copy");
                    local
                }
            },
        };

        serde_json::from_value(chosen)
            .map(Some)
            .map_err(|e| StorageError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    async fn save<T>(&self, path: &Path, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync,
    {
        self.primary.save(path, value).await?;

        if let Some(secondary) = &self.secondary
            && let Err(err) = secondary.save(path, value).await
        {
            warn!(path = %path.display(), error = %err, "secondary mirror failed");
        }
        Ok(())
    }
}

impl<P, S> fmt::Debug for StorageCoordinator<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCoordinator")
            .field("secondary", &self.secondary.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::persistence::{FileStorage, REQUESTS_FILE_MODE};
    use folio_domain::{Item, RequestsConfig};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::tempdir;

    /// Stand-in for a remote backend.
    #[derive(Default)]
    struct RemoteStorage {
        documents: Mutex<HashMap<PathBuf, Value>>,
        broken: AtomicBool,
    }

    impl RemoteStorage {
        fn with(path: &Path, document: Value) -> Self {
            let remote = Self::default();
            remote
                .documents
                .lock()
                .expect("Lock poisoned")
                .insert(path.to_path_buf(), document);
            remote
        }

        fn get(&self, path: &Path) -> Option<Value> {
            self.documents.lock().expect("Lock poisoned").get(path).cloned()
        }

        fn broken() -> Self {
            let remote = Self::default();
            remote.broken.store(true, Ordering::SeqCst);
            remote
        }

        fn check(&self, path: &Path) -> Result<(), StorageError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(StorageError::io(path, std::io::Error::other("offline")));
            }
            Ok(())
        }
    }

    impl ConfigStorage for RemoteStorage {
        async fn load<T>(&self, path: &Path) -> Result<Option<T>, StorageError>
        where
            T: DeserializeOwned + Send,
        {
            self.check(path)?;
            self.get(path)
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| StorageError::Decode {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
        }

        async fn save<T>(&self, path: &Path, value: &T) -> Result<(), StorageError>
        where
            T: Serialize + Sync,
        {
            self.check(path)?;
            let document =
                serde_json::to_value(value).map_err(|e| StorageError::Encode(e.to_string()))?;
            self.documents
                .lock()
                .expect("Lock poisoned")
                .insert(path.to_path_buf(), document);
            Ok(())
        }
    }

    fn local_tree() -> RequestsConfig {
        RequestsConfig::new()
            .with_item("f", Item::folder("Local"))
            .with_root_order(["f"])
    }

    fn remote_tree() -> Value {
        json!({
            "version": 2,
            "values": {"g": {"type": "folder", "name": "Remote"}},
            "theme": "shared"
        })
    }

    async fn coordinator(
        dir: &Path,
        remote: Option<RemoteStorage>,
        resolution: Resolution,
    ) -> (StorageCoordinator<FileStorage, RemoteStorage>, PathBuf) {
        let path = dir.join("requests.json");
        let primary = FileStorage::new(REQUESTS_FILE_MODE);
        primary.save(&path, &local_tree()).await.expect("seed");
        (
            StorageCoordinator::new(primary, remote, Arc::new(resolution)),
            path,
        )
    }

    #[tokio::test]
    async fn test_without_secondary_loads_primary() {
        let dir = tempdir().expect("temp dir");
        let (coord, path) = coordinator(dir.path(), None, Resolution::KeepRemote).await;

        let loaded: Option<RequestsConfig> = coord.load(&path).await.expect("load");
        assert_eq!(loaded, Some(local_tree()));
        assert!(!coord.has_secondary());
    }

    #[tokio::test]
    async fn test_keep_remote_replaces_local() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("requests.json");
        let remote = RemoteStorage::with(&path, remote_tree());
        let (coord, path) = coordinator(dir.path(), Some(remote), Resolution::KeepRemote).await;

        let loaded: RequestsConfig = coord.load(&path).await.expect("load").expect("document");
        assert!(loaded.values.contains_key("g"));
        assert!(!loaded.values.contains_key("f"));
    }

    #[tokio::test]
    async fn test_keep_local_ignores_remote() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("requests.json");
        let remote = RemoteStorage::with(&path, remote_tree());
        let (coord, path) = coordinator(dir.path(), Some(remote), Resolution::KeepLocal).await;

        let loaded: Option<RequestsConfig> = coord.load(&path).await.expect("load");
        assert_eq!(loaded, Some(local_tree()));
    }

    #[tokio::test]
    async fn test_merge_overlays_top_level_fields() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("requests.json");
        let remote = RemoteStorage::with(&path, remote_tree());
        let (coord, path) = coordinator(dir.path(), Some(remote), Resolution::Merge).await;

        let loaded: RequestsConfig = coord.load(&path).await.expect("load").expect("document");
        // `values` is replaced wholesale; `rootOrder` survives from local.
        assert_eq!(loaded.values.keys().collect::<Vec<_>>(), vec!["g"]);
        assert_eq!(loaded.root_order, vec!["f"]);
        assert_eq!(loaded.extra.get("theme"), Some(&json!("shared")));
    }

    #[tokio::test]
    async fn test_broken_secondary_falls_back_to_local() {
        let dir = tempdir().expect("temp dir");
        let (coord, path) =
            coordinator(dir.path(), Some(RemoteStorage::broken()), Resolution::KeepRemote).await;

        let loaded: Option<RequestsConfig> = coord.load(&path).await.expect("load");
        assert_eq!(loaded, Some(local_tree()));
    }

    #[tokio::test]
    async fn test_save_mirrors_to_secondary() {
        let dir = tempdir().expect("temp dir");
        let (coord, path) =
            coordinator(dir.path(), Some(RemoteStorage::default()), Resolution::KeepLocal).await;

        let config = local_tree().with_item("h", Item::folder("Another"));
        coord.save(&path, &config).await.expect("save");

        let mirrored = coord
            .secondary
            .as_ref()
            .and_then(|remote| remote.get(&path))
            .expect("mirrored");
        assert_eq!(mirrored["values"]["h"]["name"], "Another");
    }

    #[tokio::test]
    async fn test_secondary_save_failure_is_not_returned() {
        let dir = tempdir().expect("temp dir");
        let (coord, path) =
            coordinator(dir.path(), Some(RemoteStorage::broken()), Resolution::KeepLocal).await;

        let config = local_tree().with_item("h", Item::folder("Another"));
        coord.save(&path, &config).await.expect("save");

        let loaded: Option<RequestsConfig> = FileStorage::new(REQUESTS_FILE_MODE)
            .load(&path)
            .await
            .expect("load");
        assert_eq!(loaded, Some(config));
    }
}
