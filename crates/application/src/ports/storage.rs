//! Storage port

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while reading or writing a configuration document.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The value could not be serialized.
    #[error("failed to encode document: {0}")]
    Encode(String),

    /// The stored content is malformed.
    #[error("failed to decode {}: {message}", .path.display())]
    Decode {
        /// File that failed to decode.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

impl StorageError {
    /// Builds an [`StorageError::Io`] for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Port for loading and saving typed configuration documents.
///
/// Parent directories are created transparently by implementations.
pub trait ConfigStorage: Send + Sync {
    /// Loads the document at `path`.
    ///
    /// Returns `Ok(None)` when no document exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] on read failure and
    /// [`StorageError::Decode`] on malformed content.
    fn load<T>(&self, path: &Path) -> impl Future<Output = Result<Option<T>, StorageError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Saves `value` to `path`, replacing any previous document atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Encode`] if the value cannot be serialized
    /// and [`StorageError::Io`] if it cannot be written.
    fn save<T>(&self, path: &Path, value: &T) -> impl Future<Output = Result<(), StorageError>> + Send
    where
        T: Serialize + Sync;
}
