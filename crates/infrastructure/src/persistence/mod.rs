//! Durable storage of the configuration documents.

mod atomic_writer;
mod coordinator;
mod file_storage;
mod paths;

pub use atomic_writer::{AtomicWriter, TokioAtomicWriter};
pub use coordinator::{ConflictResolver, Resolution, StorageCoordinator};
pub use file_storage::{FileStorage, PREFERENCES_FILE_MODE, REQUESTS_FILE_MODE};
pub use paths::{APP_DIR_NAME, ConfigPaths};
