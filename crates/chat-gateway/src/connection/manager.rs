//! Connection manager
//!
//! Tracks every live connection and the room index used for fan-out, using
//! DashMap for thread-safe access.

use super::{Connection, ConnectionState, Outbound};
use crate::broadcast::Broadcast;
use crate::protocol::CloseCode;
use chat_core::RoomId;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Manages all active WebSocket connections
///
/// Room membership is recorded twice: in each connection's own room set and
/// in the `rooms` index here. Both are cleaned up together by
/// [`ConnectionManager::remove_connection`].
pub struct ConnectionManager {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// Room to session IDs mapping
    rooms: DashMap<RoomId, HashSet<String>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(&self, session_id: String, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), sender);
        self.connections.insert(session_id.clone(), connection.clone());

        tracing::debug!(session_id = %session_id, "Connection added");

        connection
    }

    /// Remove a connection and every room membership it holds
    ///
    /// Uses `alter` for atomic modify-and-cleanup operations to avoid TOCTOU race conditions.
    pub async fn remove_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        let (_, connection) = self.connections.remove(session_id)?;

        for room in connection.rooms().await {
            self.rooms.alter(&room, |_, mut sessions| {
                sessions.remove(session_id);
                sessions
            });
        }

        // Clean up all empty room entries atomically
        self.rooms.retain(|_, sessions| !sessions.is_empty());

        connection.set_state(ConnectionState::Disconnected).await;

        tracing::debug!(session_id = %session_id, "Connection removed");

        Some(connection)
    }

    /// Get a connection by session ID
    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// Add a connection to a room
    ///
    /// Returns false if the session is unknown.
    pub async fn join_room(&self, session_id: &str, room: RoomId) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };

        connection.join_room(room.clone()).await;

        self.rooms
            .entry(room.clone())
            .or_default()
            .insert(session_id.to_string());

        tracing::trace!(session_id = %session_id, room = %room, "Connection joined room");

        true
    }

    /// Remove a connection from a room
    pub async fn leave_room(&self, session_id: &str, room: &RoomId) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };

        connection.leave_room(room).await;

        self.rooms.alter(room, |_, mut sessions| {
            sessions.remove(session_id);
            sessions
        });
        self.rooms.retain(|_, sessions| !sessions.is_empty());

        tracing::trace!(session_id = %session_id, room = %room, "Connection left room");

        true
    }

    /// Session IDs currently in a room
    pub fn room_sessions(&self, room: &RoomId) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|sessions| sessions.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Resolve a broadcast target to the connections it reaches
    pub fn resolve(&self, target: &Broadcast) -> Vec<Arc<Connection>> {
        let mut sessions: HashSet<String> = if target.is_everyone() {
            self.all_sessions().into_iter().collect()
        } else {
            target
                .rooms()
                .iter()
                .flat_map(|room| self.room_sessions(room))
                .chain(target.sessions().iter().cloned())
                .collect()
        };

        for room in target.excluded_rooms() {
            for session_id in self.room_sessions(room) {
                sessions.remove(&session_id);
            }
        }

        sessions
            .into_iter()
            .filter(|session_id| !target.excludes_session(session_id))
            .filter_map(|session_id| self.get_connection(&session_id))
            .collect()
    }

    /// Ask every connection to close, returning how many were asked
    pub fn close_all(&self, code: CloseCode) -> usize {
        let mut closing = 0;

        for entry in &self.connections {
            if entry.close(code).is_ok() {
                closing += 1;
            }
        }

        tracing::info!(closing = closing, code = %code, "Closing all connections");

        closing
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get all session IDs
    pub fn all_sessions(&self) -> Vec<String> {
        self.connections.iter().map(|r| r.key().clone()).collect()
    }

    /// Check if a session exists
    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
