//! Handler error types

use crate::broadcast::BroadcastError;
use crate::events::EventName;
use chat_core::{MessageId, UserId};
use std::fmt;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Event data is missing or carries an invalid identifier
    #[error("Malformed {event} event: {reason}")]
    MalformedEvent { event: EventName, reason: String },

    /// Event name is not one clients may send
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Frame is not valid JSON
    #[error("Invalid frame: {0}")]
    Decode(#[from] serde_json::Error),

    /// A `new_message` fan-out step failed
    #[error("Failed to deliver message {} from {sender_id}: {source}", display_message_id(message_id.as_ref()))]
    Delivery {
        sender_id: UserId,
        message_id: Option<MessageId>,
        #[source]
        source: BroadcastError,
    },

    /// A relay broadcast failed
    #[error("Broadcast failed: {0}")]
    Broadcast(#[from] BroadcastError),
}

impl HandlerError {
    /// Build a `MalformedEvent` from any displayable reason
    pub fn malformed(event: EventName, reason: impl fmt::Display) -> Self {
        Self::MalformedEvent {
            event,
            reason: reason.to_string(),
        }
    }

    /// Short code for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedEvent { .. } => "MALFORMED_EVENT",
            Self::UnknownEvent(_) => "UNKNOWN_EVENT",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Delivery { .. } => "DELIVERY_FAILED",
            Self::Broadcast(_) => "BROADCAST_FAILED",
        }
    }

    /// Check if the client sent something the gateway could not use
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedEvent { .. } | Self::UnknownEvent(_) | Self::Decode(_)
        )
    }
}

fn display_message_id(message_id: Option<&MessageId>) -> &str {
    message_id.map_or("<unsaved>", MessageId::as_str)
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
