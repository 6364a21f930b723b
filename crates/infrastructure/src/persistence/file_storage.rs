//! JSON documents on the local file system.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use folio_application::ports::{ConfigStorage, StorageError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use super::atomic_writer::{AtomicWriter, TokioAtomicWriter};
use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Permission bits of the requests document.
pub const REQUESTS_FILE_MODE: u32 = 0o644;

/// Permission bits of the preferences document.
pub const PREFERENCES_FILE_MODE: u32 = 0o600;

/// Authoritative local storage: one pretty-printed JSON file per document.
#[derive(Clone)]
pub struct FileStorage {
    writer: Arc<dyn AtomicWriter>,
    mode: u32,
}

impl FileStorage {
    /// Creates a storage that writes files with `mode`.
    #[must_use]
    pub fn new(mode: u32) -> Self {
        Self::with_writer(Arc::new(TokioAtomicWriter::new()), mode)
    }

    /// Creates a storage over a custom writer.
    #[must_use]
    pub fn with_writer(writer: Arc<dyn AtomicWriter>, mode: u32) -> Self {
        Self { writer, mode }
    }

    /// Permission bits applied on save.
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }
}

impl fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("mode", &format_args!("{:o}", self.mode))
            .finish_non_exhaustive()
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<(), StorageError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    fs::create_dir_all(parent)
        .await
        .map_err(|e| StorageError::io(parent, e))
}

impl ConfigStorage for FileStorage {
    async fn load<T>(&self, path: &Path) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        ensure_parent_dir(path).await?;

        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };
        if bytes.is_empty() {
            return Ok(None);
        }

        from_json_bytes(&bytes)
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
        let bytes = to_json_stable_bytes(value).map_err(|e| StorageError::Encode(e.to_string()))?;
        ensure_parent_dir(path).await?;
        self.writer
            .write(path, &bytes, self.mode)
            .await
            .map_err(|e| StorageError::io(path, e))
    }
}
