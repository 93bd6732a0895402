//! Per-message delivery state
//!
//! The gateway keeps no delivery state of its own: it emits
//! `message_delivered`, `message_seen_update`, and `message_error`
//! transitions, and clients fold them into a ledger like this one.

use crate::{MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Delivery status of a single message as observed by one client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryState {
    pub delivered: bool,
    pub seen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seen_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seen_at: Option<DateTime<Utc>>,
    pub failed: bool,
}

/// Delivery states keyed by message id
#[derive(Debug, Clone, Default)]
pub struct DeliveryLedger {
    states: HashMap<MessageId, DeliveryState>,
}

impl DeliveryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `message_delivered` transition
    pub fn mark_delivered(&mut self, message_id: MessageId) {
        self.states.entry(message_id).or_default().delivered = true;
    }

    /// Apply a `message_seen_update` transition
    ///
    /// A seen message is necessarily delivered.
    pub fn mark_seen(&mut self, message_id: MessageId, seen_by: UserId, seen_at: DateTime<Utc>) {
        let state = self.states.entry(message_id).or_default();
        state.delivered = true;
        state.seen = true;
        state.seen_by = Some(seen_by);
        state.seen_at = Some(seen_at);
    }

    /// Apply a `message_error` transition
    pub fn mark_failed(&mut self, message_id: MessageId) {
        self.states.entry(message_id).or_default().failed = true;
    }

    /// Get the state of a message, if any transition was observed
    #[must_use]
    pub fn get(&self, message_id: &MessageId) -> Option<&DeliveryState> {
        self.states.get(message_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
