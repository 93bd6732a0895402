//! Event frame format
//!
//! `{"event": "<name>", "data": <payload>}` from clients;
//! `{"event": "<name>", "s": <seq>, "data": <payload>}` from the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single event on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    /// Event name
    pub event: String,

    /// Per-connection sequence number (server frames only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event payload
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl EventFrame {
    /// Create an unsequenced frame (as sent by clients)
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            s: None,
            data,
        }
    }

    /// Create a server frame carrying a sequence number
    #[must_use]
    pub fn sequenced(event: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            event: event.into(),
            s: Some(sequence),
            data,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for EventFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.s {
            Some(s) => write!(f, "EventFrame(event={}, s={s})", self.event),
            None => write!(f, "EventFrame(event={})", self.event),
        }
    }
}
