//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection and its state.

use crate::events::EventName;
use crate::protocol::{CloseCode, EventFrame};
use chat_core::{RoomId, UserId};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Socket open, no `setup` yet
    Connected,
    /// Bound to a user by `setup`
    Identified,
    /// Socket closed
    Disconnected,
}

/// Work item for a connection's send task
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Event to encode; the send task stamps the sequence number
    Event { event: EventName, data: Value },
    /// Close the socket with this code
    Close(CloseCode),
}

/// Why an outbound item could not be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    #[error("outbound queue is full")]
    Full,
    #[error("connection is closed")]
    Closed,
}

/// A single WebSocket connection
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Identified user (None until `setup`)
    user_id: RwLock<Option<UserId>>,

    /// Current connection state
    state: RwLock<ConnectionState>,

    /// Queue drained by the send task
    sender: mpsc::Sender<Outbound>,

    /// Last sequence number sent
    sequence: AtomicU64,

    /// Last inbound traffic
    last_activity: RwLock<Instant>,

    /// Rooms this connection belongs to
    rooms: RwLock<HashSet<RoomId>>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(session_id: String, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            user_id: RwLock::new(None),
            state: RwLock::new(ConnectionState::Connected),
            sender,
            sequence: AtomicU64::new(0),
            last_activity: RwLock::new(Instant::now()),
            rooms: RwLock::new(HashSet::new()),
            created_at: Instant::now(),
        })
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Bind the connection to a user
    ///
    /// Returns the user it was previously bound to, if any.
    pub async fn identify(&self, user_id: UserId) -> Option<UserId> {
        let previous = self.user_id.write().await.replace(user_id);
        *self.state.write().await = ConnectionState::Identified;
        previous
    }

    /// Get the current state
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Set the connection state
    pub async fn set_state(&self, state: ConnectionState) {
        *self.state.write().await = state;
    }

    /// Get the next sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Stamp an event with the next sequence number
    pub fn sequence_frame(&self, event: EventName, data: Value) -> EventFrame {
        EventFrame::sequenced(event, self.next_sequence(), data)
    }

    /// Record inbound traffic
    pub async fn record_activity(&self) {
        *self.last_activity.write().await = Instant::now();
    }

    /// Get time since the last inbound traffic
    pub async fn time_since_activity(&self) -> Duration {
        self.last_activity.read().await.elapsed()
    }

    /// Record room membership on the connection side
    ///
    /// Returns true if the connection was not already in the room.
    pub async fn join_room(&self, room: RoomId) -> bool {
        self.rooms.write().await.insert(room)
    }

    /// Drop room membership on the connection side
    pub async fn leave_room(&self, room: &RoomId) -> bool {
        self.rooms.write().await.remove(room)
    }

    /// Get all rooms this connection is in
    pub async fn rooms(&self) -> Vec<RoomId> {
        self.rooms.read().await.iter().cloned().collect()
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue an event without waiting
    pub fn push(&self, event: EventName, data: Value) -> Result<(), PushError> {
        self.try_send(Outbound::Event { event, data })
    }

    /// Ask the send task to close the socket
    pub fn close(&self, code: CloseCode) -> Result<(), PushError> {
        self.try_send(Outbound::Close(code))
    }

    fn try_send(&self, item: Outbound) -> Result<(), PushError> {
        self.sender.try_send(item).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PushError::Full,
            mpsc::error::TrySendError::Closed(_) => PushError::Closed,
        })
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
