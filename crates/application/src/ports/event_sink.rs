//! Event sink port

use tokio::sync::mpsc::UnboundedSender;

use crate::events::ConfigEvent;

/// Port for delivering configuration notifications to an observer.
///
/// `emit` is called synchronously from the publishing task and must not
/// block.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn emit(&self, event: ConfigEvent);
}

impl EventSink for UnboundedSender<ConfigEvent> {
    fn emit(&self, event: ConfigEvent) {
        // A closed receiver means nobody is listening any more.
        let _ = self.send(event);
    }
}
