//! EventBroadcaster - single shared topic for order events
//!
//! ```text
//! OrdersManager ──commit_and_publish()──▶ broadcast::Sender<OrderEvent>
//!                                                │
//!                         ┌──────────────────────┼──────────────────────┐
//!                         ▼                      ▼                      ▼
//!                   staff dashboard       tracking page (id)      tracking page (id)
//! ```
//!
//! Delivery is best-effort: there is no replay, a subscriber that joins late
//! only sees later events, and a subscriber that falls more than the channel
//! capacity behind loses the oldest events. Each event carries a process-wide
//! `sequence` so subscribers can drop stale updates: sequences follow commit
//! order, so for one order a higher sequence is always the newer state.

use parking_lot::Mutex;
use shared::order::{OrderEvent, OrderEventType, OrderSnapshot, OrderStatus};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Default capacity of the broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// What happened to a published event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Handed to this many subscribers
    Delivered(usize),
    /// Nobody was listening; the event is gone
    NoSubscribers,
}

#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<OrderEvent>,
    /// Last sequence handed out; held across commit and send so sequences
    /// follow commit order and reach subscribers in increasing order
    sequence: Arc<Mutex<u64>>,
    shutdown_token: CancellationToken,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl EventBroadcaster {
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            sequence: Arc::new(Mutex::new(0)),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Publish the full snapshot of an order that has just been committed
    ///
    /// Never fails the caller: the order is already durable, a missing
    /// audience only means nobody sees this change live.
    pub fn publish(
        &self,
        event_type: OrderEventType,
        previous_status: Option<OrderStatus>,
        payload: OrderSnapshot,
    ) -> (u64, PublishOutcome) {
        let mut sequence = self.sequence.lock();
        self.send_next(&mut sequence, event_type, previous_status, payload)
    }

    /// Run `commit`, then publish, holding the sequence lock across both
    ///
    /// Writers that commit in the order A, B publish with sequences A < B.
    /// Nothing is published when `commit` fails. `commit` must not publish on
    /// this bus itself.
    pub fn commit_and_publish<E>(
        &self,
        commit: impl FnOnce() -> Result<(), E>,
        event_type: OrderEventType,
        previous_status: Option<OrderStatus>,
        payload: OrderSnapshot,
    ) -> Result<(u64, PublishOutcome), E> {
        let mut sequence = self.sequence.lock();
        commit()?;
        Ok(self.send_next(&mut sequence, event_type, previous_status, payload))
    }

    fn send_next(
        &self,
        sequence: &mut u64,
        event_type: OrderEventType,
        previous_status: Option<OrderStatus>,
        payload: OrderSnapshot,
    ) -> (u64, PublishOutcome) {
        *sequence += 1;
        let event = OrderEvent {
            event_type,
            sequence: *sequence,
            emitted_at: shared::util::now_millis(),
            previous_status,
            payload,
        };
        let order_id = event.order_id();

        let outcome = match self.tx.send(event) {
            Ok(receivers) => PublishOutcome::Delivered(receivers),
            Err(_) => {
                tracing::warn!(
                    order_id,
                    sequence = *sequence,
                    "Event broadcast failed: no active receivers"
                );
                PublishOutcome::NoSubscribers
            }
        };
        tracing::debug!(order_id, sequence = *sequence, ?event_type, ?outcome, "Order event published");
        (*sequence, outcome)
    }

    /// Subscribe to every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    /// Subscribe and learn the last sequence already published, atomically
    ///
    /// Every event received on the returned receiver has a greater sequence.
    pub fn subscribe_from(&self) -> (u64, broadcast::Receiver<OrderEvent>) {
        let sequence = self.sequence.lock();
        (*sequence, self.tx.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Last sequence handed out
    pub fn current_sequence(&self) -> u64 {
        *self.sequence.lock()
    }

    /// Token cancelled on shutdown; live connections watch it
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down event broadcaster");
        self.shutdown_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }
}
