//! Event dispatcher
//!
//! Encodes a server event once and queues it on every connection a
//! [`Broadcast`] resolves to. Never waits on a peer's socket.

use super::Broadcast;
use crate::connection::{ConnectionManager, PushError};
use crate::events::{EventName, ServerEvent};
use std::sync::Arc;
use thiserror::Error;

/// Fan-out failures
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// One or more target queues were full
    #[error("{event}: outbound queue full for {} connection(s), {delivered} delivered", sessions.len())]
    Backpressure {
        event: EventName,
        sessions: Vec<String>,
        delivered: usize,
    },

    /// Payload could not be encoded
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Queues server events on connections
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    connection_manager: Arc<ConnectionManager>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// Queue `event` on every connection `target` reaches
    ///
    /// Closed connections are skipped. Returns the number of connections the
    /// event was queued on.
    ///
    /// # Errors
    /// `Backpressure` if any target queue was full (the event is still queued
    /// everywhere else), `Encode` if the payload cannot be serialized.
    pub fn emit(&self, target: &Broadcast, event: &ServerEvent) -> Result<usize, BroadcastError> {
        let name = event.name();
        let data = event.data()?;

        let mut delivered = 0;
        let mut backpressured = Vec::new();

        for connection in self.connection_manager.resolve(target) {
            match connection.push(name, data.clone()) {
                Ok(()) => delivered += 1,
                Err(PushError::Full) => {
                    tracing::warn!(
                        session_id = %connection.session_id(),
                        event = %name,
                        "Outbound queue full"
                    );
                    backpressured.push(connection.session_id().to_string());
                }
                Err(PushError::Closed) => {
                    tracing::trace!(
                        session_id = %connection.session_id(),
                        event = %name,
                        "Skipping closed connection"
                    );
                }
            }
        }

        tracing::trace!(event = %name, delivered = delivered, "Event dispatched");

        if backpressured.is_empty() {
            Ok(delivered)
        } else {
            Err(BroadcastError::Backpressure {
                event: name,
                sessions: backpressured,
                delivered,
            })
        }
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        &self.connection_manager
    }
}
