//! Multicast stream that fans snapshot payloads out to live subscribers.

use crate::observability::events;
use tokio::sync::broadcast::{self, error::SendError, Receiver, Sender};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

const COMPONENT: &str = "multicast";

/// Publishing half, owned by one subscription entry.
pub(crate) struct SnapshotPublisher {
    sender: Sender<String>,
}

impl SnapshotPublisher {
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns how many subscribers the payload was queued for; zero subscribers
    /// is not an error and nothing is retained.
    pub(crate) fn publish(&self, payload: String) -> usize {
        match self.sender.send(payload) {
            Ok(subscribers) => subscribers,
            Err(SendError(_)) => 0,
        }
    }

    pub(crate) fn stream(&self) -> ConsoleStream {
        ConsoleStream {
            sender: self.sender.clone(),
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Subscribe-only handle onto a subscription's payload stream.
///
/// Subscribers joining late see only payloads published after they joined. Each
/// subscriber buffers up to the configured queue size; when it falls further
/// behind, the oldest unread payloads are dropped so the ticker never waits.
#[derive(Clone)]
pub struct ConsoleStream {
    sender: Sender<String>,
}

impl ConsoleStream {
    pub fn subscribe(&self) -> Receiver<String> {
        self.sender.subscribe()
    }

    /// Subscribes and adapts the receiver into a [`Stream`] that skips payloads
    /// lost to lag and ends when the subscription is gone.
    ///
    /// Consumes the handle so that it does not keep the stream open by itself.
    pub fn into_stream(self) -> impl Stream<Item = String> + Send + 'static {
        let receiver = self.sender.subscribe();
        drop(self);
        BroadcastStream::new(receiver).filter_map(|item| match item {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!(
                    event = events::STREAM_RECV_LAGGED,
                    component = COMPONENT,
                    err = %err,
                    "subscriber lagged; oldest payloads dropped"
                );
                None
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Whether both handles refer to the same subscription's stream.
    pub fn same_stream(&self, other: &ConsoleStream) -> bool {
        self.sender.same_channel(&other.sender)
    }
}
