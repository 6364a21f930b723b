//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod event_sink;
mod storage;

pub use clock::Clock;
pub use event_sink::EventSink;
pub use storage::{ConfigStorage, StorageError};
