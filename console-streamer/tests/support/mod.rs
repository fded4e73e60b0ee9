#![allow(dead_code)]

use console_streamer::{
    ConsoleStreamer, OptionSet, ProviderRegistry, SnapshotError, SnapshotProvider, StreamerConfig,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;

pub const TICK_MS: u64 = 20;

pub fn tick() -> Duration {
    Duration::from_millis(TICK_MS)
}

/// Counts every call and echoes the options alongside the call number.
pub struct CountingProvider {
    id: String,
    calls: AtomicUsize,
}

impl CountingProvider {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnapshotProvider for CountingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn snapshot(&self, options: &OptionSet) -> Result<Option<Value>, SnapshotError> {
        let seq = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(json!({ "seq": seq, "options": options })))
    }
}

/// Fails every call, counting attempts.
pub struct FailingProvider {
    id: String,
    calls: AtomicUsize,
}

impl FailingProvider {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SnapshotProvider for FailingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn snapshot(&self, _options: &OptionSet) -> Result<Option<Value>, SnapshotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SnapshotError::failed("backend unavailable"))
    }
}

pub struct PanickingProvider {
    id: String,
}

impl PanickingProvider {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self { id: id.to_string() })
    }
}

impl SnapshotProvider for PanickingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn snapshot(&self, _options: &OptionSet) -> Result<Option<Value>, SnapshotError> {
        panic!("provider {} exploded", self.id)
    }
}

pub fn make_streamer(interval_ms: u64, providers: Arc<ProviderRegistry>) -> ConsoleStreamer {
    ConsoleStreamer::new(
        "integration",
        StreamerConfig::default().with_update_interval(Duration::from_millis(interval_ms)),
        providers,
    )
}

pub fn empty_registry() -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::new())
}

pub fn single_provider(provider: Arc<dyn SnapshotProvider>) -> Arc<ProviderRegistry> {
    let registry = ProviderRegistry::new();
    registry.register(provider);
    Arc::new(registry)
}

pub fn options(pairs: &[(&str, &str)]) -> OptionSet {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), json!(value)))
        .collect()
}

/// Next payload, or `None` if nothing arrives within `wait`.
pub async fn recv_within(receiver: &mut Receiver<String>, wait: Duration) -> Option<String> {
    tokio::time::timeout(wait, receiver.recv())
        .await
        .ok()
        .and_then(Result::ok)
}

pub fn seq_of(payload: &str) -> usize {
    let value: Value = serde_json::from_str(payload).expect("payload is JSON");
    let seq = value["seq"].as_u64().expect("payload carries a seq");
    usize::try_from(seq).expect("seq fits in usize")
}
