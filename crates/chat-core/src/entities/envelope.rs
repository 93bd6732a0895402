//! Message envelope
//!
//! A message that the persistence collaborator has already stored, as the
//! sending client hands it to the gateway for fan-out.

use crate::{ChatId, DomainError, MessageId, UserId};
use serde_json::Value;

/// Already-persisted message entering the delivery pipeline
///
/// The gateway only reads the routing fields; `payload` is relayed verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEnvelope {
    /// Persisted message id (`_id`), when the client supplied one
    pub message_id: Option<MessageId>,
    /// Chat the message belongs to (`chat` or `chat._id`)
    pub chat_id: ChatId,
    /// Author of the message (`sender._id`)
    pub sender_id: UserId,
    /// The message exactly as received
    pub payload: Value,
}

impl MessageEnvelope {
    /// Build an envelope from a raw message document
    ///
    /// `chat` may be a bare id or a populated chat document; `sender` may be a
    /// bare id or a populated user document. Both must resolve to a non-empty id.
    pub fn from_value(payload: Value) -> Result<Self, DomainError> {
        if !payload.is_object() {
            return Err(DomainError::InvalidField {
                field: "message",
                reason: "expected an object".to_string(),
            });
        }

        let chat_id = payload
            .get("chat")
            .and_then(document_id)
            .ok_or(DomainError::MissingField("chat"))
            .and_then(ChatId::parse)?;

        let sender_id = payload
            .get("sender")
            .and_then(document_id)
            .ok_or(DomainError::MissingField("sender._id"))
            .and_then(UserId::parse)?;

        let message_id = payload
            .get("_id")
            .and_then(Value::as_str)
            .and_then(|id| MessageId::parse(id).ok());

        Ok(Self {
            message_id,
            chat_id,
            sender_id,
            payload,
        })
    }
}

/// Resolve a reference that is either an id string or a document with `_id`
fn document_id(value: &Value) -> Option<&str> {
    match value {
        Value::String(id) => Some(id.as_str()),
        Value::Object(doc) => doc.get("_id").and_then(Value::as_str),
        _ => None,
    }
}
