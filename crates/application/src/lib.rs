//! Folio Application - Configuration managers
//!
//! This crate owns the in-memory documents, validates and commits every
//! mutation, publishes change notifications and schedules persistence.
//! I/O happens behind the traits in [`ports`].

pub mod debounce;
pub mod error;
pub mod events;
pub mod patch;
pub mod ports;
pub mod preferences_manager;
pub mod requests_manager;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use error::{ConfigError, ConfigResult};
pub use events::{ConfigEvent, EventBus, EventKind};
pub use ports::{Clock, ConfigStorage, EventSink, StorageError};
pub use preferences_manager::PreferencesManager;
pub use requests_manager::RequestsManager;
pub use service::ConfigService;
pub use store::{ConfigStore, VersionedConfig};
