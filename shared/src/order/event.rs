//! Live order events
//!
//! Every event carries the complete order snapshot. `sequence` increases
//! monotonically per server process so subscribers can drop stale updates.

use super::snapshot::OrderSnapshot;
use super::types::OrderStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    #[serde(rename = "type")]
    pub event_type: OrderEventType,
    pub sequence: u64,
    /// Server timestamp (Unix milliseconds)
    pub emitted_at: i64,
    /// Status before the change (status-changed only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<OrderStatus>,
    pub payload: OrderSnapshot,
}

impl OrderEvent {
    pub fn order_id(&self) -> i64 {
        self.payload.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OrderEventType {
    Created,
    StatusChanged,
    Purged,
}

/// Control frames sent on the live stream next to [`OrderEvent`]s
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LiveControl {
    /// Subscription established; events after `sequence` will follow
    Ready { sequence: u64 },
    /// Subscriber fell behind and `missed` events were dropped; refetch
    Resync { missed: u64 },
}
