//! Change notifications published by the configuration managers.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::ports::EventSink;

/// Which state transition an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The in-memory state changed.
    Updated,
    /// The committed state reached disk.
    Saved,
    /// A deferred save failed.
    Error,
}

impl EventKind {
    /// Suffix appended to the topic to form the event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Saved => "saved",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named notification with a JSON payload, e.g. `requests:saved`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEvent {
    /// `topic:kind`.
    pub name: String,
    /// Event data.
    pub payload: Value,
}

/// Publishes events for one topic to the connected sink, if any.
///
/// With no sink connected every publish is a no-op.
pub struct EventBus {
    topic: &'static str,
    sink: RwLock<Option<Arc<dyn EventSink>>>,
}

impl EventBus {
    /// Creates a bus with no sink connected.
    #[must_use]
    pub const fn new(topic: &'static str) -> Self {
        Self {
            topic,
            sink: RwLock::new(None),
        }
    }

    /// Connects a sink, replacing the previous one.
    pub fn connect(&self, sink: Arc<dyn EventSink>) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    /// Disconnects the current sink.
    pub fn disconnect(&self) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns true if a sink is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Publishes `topic:updated` with the given snapshot.
    pub fn updated(&self, payload: Value) {
        self.publish(EventKind::Updated, payload);
    }

    /// Publishes `topic:saved` with the write time and file path.
    pub fn saved(&self, updated_at: DateTime<Utc>, path: &Path) {
        self.publish(
            EventKind::Saved,
            json!({
                "updatedAt": updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                "path": path.display().to_string(),
            }),
        );
    }

    /// Publishes `topic:error` with a human-readable message.
    pub fn error(&self, message: impl fmt::Display) {
        self.publish(EventKind::Error, json!({ "message": message.to_string() }));
    }

    fn publish(&self, kind: EventKind, payload: Value) {
        let sink = self
            .sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(sink) = sink else {
            return;
        };
        let name = format!("{}:{kind}", self.topic);
        tracing::trace!(event = %name, "publishing");
        sink.emit(ConfigEvent { name, payload });
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("topic", &self.topic)
            .field("connected", &self.is_connected())
            .finish()
    }
}
