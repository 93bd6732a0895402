//! Client → server events
//!
//! Every inbound frame is decoded into a [`ClientEvent`] before any handler
//! runs, so handlers only ever see validated identifiers.

use super::EventName;
use crate::handlers::{HandlerError, HandlerResult};
use crate::protocol::EventFrame;
use chat_core::{ChatId, DomainError, MessageEnvelope, MessageId, UserId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// A decoded client event
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Setup { user_id: UserId },
    JoinChat { chat_id: ChatId },
    NewMessage(MessageEnvelope),
    MessageSeen(SeenSignal),
    Typing(TypingSignal),
    StopTyping(TypingSignal),
    UserActivity { user_id: UserId },
    GetOnlineUsers,
}

/// `message_seen` data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenSignal {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    pub user_id: UserId,
}

/// `typing` / `stop_typing` data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSignal {
    pub chat_id: ChatId,
    pub user_id: UserId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeen {
    message_id: Option<String>,
    chat_id: Option<String>,
    user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTyping {
    chat_id: Option<String>,
    user_id: Option<String>,
}

impl ClientEvent {
    /// Decode a frame received from a client
    ///
    /// # Errors
    /// `UnknownEvent` for names clients may not send, `MalformedEvent` when
    /// the data is missing or carries an empty identifier.
    pub fn from_frame(frame: EventFrame) -> HandlerResult<Self> {
        let name = EventName::parse(&frame.event)
            .filter(|name| name.is_client_event())
            .ok_or_else(|| HandlerError::UnknownEvent(frame.event.clone()))?;

        let data = frame.data;

        match name {
            EventName::Setup => Ok(Self::Setup {
                user_id: string_id(name, data, "userId")?,
            }),
            EventName::JoinChat => Ok(Self::JoinChat {
                chat_id: string_id(name, data, "chatId")?,
            }),
            EventName::UserActivity => Ok(Self::UserActivity {
                user_id: string_id(name, data, "userId")?,
            }),
            EventName::NewMessage => MessageEnvelope::from_value(data)
                .map(Self::NewMessage)
                .map_err(|e| HandlerError::malformed(name, e)),
            EventName::MessageSeen => {
                let raw: RawSeen = object(name, data)?;
                Ok(Self::MessageSeen(SeenSignal {
                    message_id: required(name, "messageId", raw.message_id)?,
                    chat_id: required(name, "chatId", raw.chat_id)?,
                    user_id: required(name, "userId", raw.user_id)?,
                }))
            }
            EventName::Typing | EventName::StopTyping => {
                let raw: RawTyping = object(name, data)?;
                let signal = TypingSignal {
                    chat_id: required(name, "chatId", raw.chat_id)?,
                    user_id: required(name, "userId", raw.user_id)?,
                };
                Ok(if name == EventName::Typing {
                    Self::Typing(signal)
                } else {
                    Self::StopTyping(signal)
                })
            }
            EventName::GetOnlineUsers => Ok(Self::GetOnlineUsers),
            _ => Err(HandlerError::UnknownEvent(frame.event)),
        }
    }

    /// Name of the event
    #[must_use]
    pub const fn name(&self) -> EventName {
        match self {
            Self::Setup { .. } => EventName::Setup,
            Self::JoinChat { .. } => EventName::JoinChat,
            Self::NewMessage(_) => EventName::NewMessage,
            Self::MessageSeen(_) => EventName::MessageSeen,
            Self::Typing(_) => EventName::Typing,
            Self::StopTyping(_) => EventName::StopTyping,
            Self::UserActivity { .. } => EventName::UserActivity,
            Self::GetOnlineUsers => EventName::GetOnlineUsers,
        }
    }
}

/// Events whose data is a bare id string
fn string_id<T>(event: EventName, data: Value, field: &'static str) -> HandlerResult<T>
where
    T: TryFrom<String, Error = DomainError>,
{
    match data {
        Value::String(raw) => T::try_from(raw).map_err(|e| HandlerError::malformed(event, e)),
        Value::Null => Err(HandlerError::malformed(event, DomainError::MissingField(field))),
        other => Err(HandlerError::malformed(
            event,
            DomainError::InvalidField {
                field,
                reason: format!("expected a string, got {other}"),
            },
        )),
    }
}

fn object<T: DeserializeOwned>(event: EventName, data: Value) -> HandlerResult<T> {
    if !data.is_object() {
        return Err(HandlerError::malformed(
            event,
            DomainError::InvalidField {
                field: "data",
                reason: "expected an object".to_string(),
            },
        ));
    }
    serde_json::from_value(data).map_err(|e| HandlerError::MalformedEvent {
        event,
        reason: e.to_string(),
    })
}

fn required<T>(event: EventName, field: &'static str, value: Option<String>) -> HandlerResult<T>
where
    T: TryFrom<String, Error = DomainError>,
{
    let raw = value.ok_or_else(|| HandlerError::malformed(event, DomainError::MissingField(field)))?;
    T::try_from(raw).map_err(|e| HandlerError::malformed(event, e))
}
