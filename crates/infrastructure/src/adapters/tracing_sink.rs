//! Event sink that writes notifications to the log.

use std::sync::atomic::{AtomicU64, Ordering};

use folio_application::ports::EventSink;
use folio_application::{ConfigEvent, EventKind};
use tracing::{debug, info, warn};

/// Logs every configuration event.
///
/// Saves are logged at `info`, failures at `warn` and in-memory updates,
/// which carry the whole document, at `debug`.
#[derive(Debug, Default)]
pub struct TracingEventSink {
    emitted: AtomicU64,
}

impl TracingEventSink {
    /// Creates a new sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
        }
    }

    /// Number of events seen so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}

fn kind_of(event: &ConfigEvent) -> Option<EventKind> {
    let (_, kind) = event.name.rsplit_once(':')?;
    [EventKind::Updated, EventKind::Saved, EventKind::Error]
        .into_iter()
        .find(|candidate| candidate.as_str() == kind)
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: ConfigEvent) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        match kind_of(&event) {
            Some(EventKind::Saved) => info!(
                event = %event.name,
                path = event.payload["path"].as_str().unwrap_or_default(),
                updated_at = event.payload["updatedAt"].as_str().unwrap_or_default(),
                "configuration saved"
            ),
            Some(EventKind::Error) => warn!(
                event = %event.name,
                message = event.payload["message"].as_str().unwrap_or_default(),
                "configuration error"
            ),
            Some(EventKind::Updated) | None => {
                debug!(event = %event.name, payload = %event.payload, "configuration event");
            }
        }
    }
}
