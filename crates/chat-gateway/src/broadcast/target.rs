//! Broadcast targets

use chat_core::RoomId;
use std::collections::HashSet;

/// Who an event is sent to
///
/// Built from rooms and sessions, then narrowed with `except*`:
///
/// ```ignore
/// Broadcast::to(chat_room).except(origin_session).except_room(sender_room)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Broadcast {
    everyone: bool,
    rooms: Vec<RoomId>,
    sessions: Vec<String>,
    except_sessions: HashSet<String>,
    except_rooms: Vec<RoomId>,
}

impl Broadcast {
    /// Every live connection
    #[must_use]
    pub fn everyone() -> Self {
        Self {
            everyone: true,
            ..Self::default()
        }
    }

    /// Every connection in a room
    #[must_use]
    pub fn to(room: impl Into<RoomId>) -> Self {
        Self {
            rooms: vec![room.into()],
            ..Self::default()
        }
    }

    /// A single connection
    #[must_use]
    pub fn session(session_id: impl Into<String>) -> Self {
        Self {
            sessions: vec![session_id.into()],
            ..Self::default()
        }
    }

    /// Leave out one connection
    pub fn except(mut self, session_id: impl Into<String>) -> Self {
        self.except_sessions.insert(session_id.into());
        self
    }

    /// Leave out every connection in a room
    pub fn except_room(mut self, room: impl Into<RoomId>) -> Self {
        self.except_rooms.push(room.into());
        self
    }

    pub fn is_everyone(&self) -> bool {
        self.everyone
    }

    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    pub fn sessions(&self) -> &[String] {
        &self.sessions
    }

    pub fn excluded_rooms(&self) -> &[RoomId] {
        &self.except_rooms
    }

    pub fn excludes_session(&self, session_id: &str) -> bool {
        self.except_sessions.contains(session_id)
    }
}
