//! Event fan-out to live subscribers.
//!
//! The hub decouples the simulation tick from whoever is watching it. Each
//! subscriber reads at its own pace from bounded buffering; when a
//! subscriber falls more than the buffer capacity behind, its oldest unread
//! events are dropped and delivery continues from there. Publishing never
//! blocks and one subscriber's backlog never affects another subscriber.

use tokio::sync::broadcast;
use tracing::{trace, warn};

use super::event::TrainEvent;

/// Default per-subscriber buffer capacity.
const DEFAULT_CAPACITY: usize = 256;

/// Publish/subscribe hub for simulation events.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<TrainEvent>,
}

impl BroadcastHub {
    /// Create a hub whose subscribers each buffer up to `capacity` unread
    /// events before the oldest are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new subscriber.
    ///
    /// The subscription observes every event published from this point on,
    /// in publish order; nothing published earlier is replayed. Dropping
    /// the subscription unsubscribes.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Publish an event to all current subscribers. Never blocks.
    pub fn publish(&self, event: TrainEvent) {
        trace!(train = %event.train_id, edge = event.edge, status = ?event.status, "publish");
        // With no subscribers the event has nowhere to go; that is fine.
        let _ = self.tx.send(event);
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A registered subscriber's receiving end.
pub struct Subscription {
    rx: broadcast::Receiver<TrainEvent>,
}

impl Subscription {
    /// Receive the next event, waiting if none is pending.
    ///
    /// If this subscriber fell behind and events were dropped, the gap is
    /// logged and delivery resumes with the oldest event still buffered.
    /// Returns `None` once the hub has been dropped and every pending
    /// event has been drained.
    pub async fn recv(&mut self) -> Option<TrainEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagging, dropped oldest events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive the next pending event without waiting.
    ///
    /// Returns `None` when no event is pending (or the hub is gone). Lag is
    /// handled as in [`Subscription::recv`].
    pub fn try_recv(&mut self) -> Option<TrainEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagging, dropped oldest events");
                }
                Err(_) => return None,
            }
        }
    }
}
