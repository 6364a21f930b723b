//! Folio Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: atomic JSON files, an optional
//! mirrored secondary backend, platform paths and process settings.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

pub use adapters::{SystemClock, TracingEventSink};
pub use config::{AppConfig, AppConfigError};
pub use persistence::{
    AtomicWriter, ConfigPaths, ConflictResolver, FileStorage, PREFERENCES_FILE_MODE,
    REQUESTS_FILE_MODE, Resolution, StorageCoordinator, TokioAtomicWriter,
};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
