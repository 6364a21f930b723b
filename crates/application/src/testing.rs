//! Test doubles shared by the manager tests.

#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::events::{ConfigEvent, EventBus};
use crate::ports::{Clock, ConfigStorage, StorageError};

/// In-memory storage that counts writes.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    documents: Arc<Mutex<HashMap<PathBuf, Value>>>,
    saves: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    latency: Arc<Mutex<Duration>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, path: impl Into<PathBuf>, document: Value) {
        self.documents
            .lock()
            .expect("Lock poisoned")
            .insert(path.into(), document);
    }

    pub fn stored<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Option<T> {
        let documents = self.documents.lock().expect("Lock poisoned");
        documents
            .get(path.as_ref())
            .map(|doc| serde_json::from_value(doc.clone()).expect("stored document decodes"))
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes every later save take `latency` of tokio time.
    pub fn slow_saves(&self, latency: Duration) {
        *self.latency.lock().expect("Lock poisoned") = latency;
    }
}

impl ConfigStorage for MemoryStorage {
    async fn load<T>(&self, path: &Path) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned + Send,
    {
        let document = self
            .documents
            .lock()
            .expect("Lock poisoned")
            .get(path)
            .cloned();
        document
            .map(|doc| {
                serde_json::from_value(doc).map_err(|e| StorageError::Decode {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    async fn save<T>(&self, path: &Path, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync,
    {
        let latency = *self.latency.lock().expect("Lock poisoned");
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::io(
                path,
                std::io::Error::other("disk full"),
            ));
        }
        let document =
            serde_json::to_value(value).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.put(path, document);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Clock pinned to one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Connects a channel to `bus` and returns its receiving end.
pub fn collect_events(bus: &EventBus) -> UnboundedReceiver<ConfigEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    bus.connect(Arc::new(tx));
    rx
}

/// Takes every event received so far.
pub fn drain(rx: &mut UnboundedReceiver<ConfigEvent>) -> Vec<ConfigEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
