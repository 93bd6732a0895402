//! Server → client events and their payloads

use super::EventName;
use chat_core::{ChatId, MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reason reported to the sender when fan-out fails
pub const DELIVERY_FAILED_REASON: &str = "Failed to deliver message";

/// An event the server pushes to connections
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Everyone currently online
    OnlineUsers(Vec<UserId>),
    /// A message for the chat's recipients, relayed verbatim
    MessageReceived(Value),
    /// The server has fanned a message out
    MessageDelivered(MessageDeliveredPayload),
    /// Fan-out of a message failed
    MessageError(MessageErrorPayload),
    /// Read receipt
    MessageSeenUpdate(SeenUpdatePayload),
    /// Someone started typing
    Typing(TypingPayload),
    /// Someone stopped typing
    StopTyping(TypingPayload),
}

impl ServerEvent {
    /// Wire name of the event
    #[must_use]
    pub const fn name(&self) -> EventName {
        match self {
            Self::OnlineUsers(_) => EventName::OnlineUsers,
            Self::MessageReceived(_) => EventName::MessageReceived,
            Self::MessageDelivered(_) => EventName::MessageDelivered,
            Self::MessageError(_) => EventName::MessageError,
            Self::MessageSeenUpdate(_) => EventName::MessageSeenUpdate,
            Self::Typing(_) => EventName::Typing,
            Self::StopTyping(_) => EventName::StopTyping,
        }
    }

    /// Encode the payload as the frame's `data`
    pub fn data(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::OnlineUsers(users) => serde_json::to_value(users),
            Self::MessageReceived(message) => Ok(message.clone()),
            Self::MessageDelivered(payload) => serde_json::to_value(payload),
            Self::MessageError(payload) => serde_json::to_value(payload),
            Self::MessageSeenUpdate(payload) => serde_json::to_value(payload),
            Self::Typing(payload) | Self::StopTyping(payload) => serde_json::to_value(payload),
        }
    }
}

/// `message_delivered` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeliveredPayload {
    pub message_id: Option<MessageId>,
}

/// `message_error` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageErrorPayload {
    pub message_id: Option<MessageId>,
    pub error: String,
}

impl MessageErrorPayload {
    /// Generic delivery failure for a message
    #[must_use]
    pub fn delivery_failed(message_id: Option<MessageId>) -> Self {
        Self {
            message_id,
            error: DELIVERY_FAILED_REASON.to_string(),
        }
    }
}

/// `message_seen_update` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenUpdatePayload {
    pub message_id: MessageId,
    pub seen_by: UserId,
    pub timestamp: DateTime<Utc>,
}

/// `typing` / `stop_typing` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub chat_id: ChatId,
    pub user_id: UserId,
}
