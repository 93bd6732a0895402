//! Presence registry
//!
//! Maps each online user to the connection that identified as them. Owned by
//! the gateway state and shared between connection tasks.

use chat_core::UserId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

/// A user's presence record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub user_id: UserId,
    /// Connection that registered this user
    pub session_id: String,
    pub connected_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Online users, at most one entry per user
///
/// A later `register` for the same user replaces the earlier entry, and a
/// session is bound to at most one user at a time.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: RwLock<HashMap<UserId, PresenceEntry>>,
}

impl PresenceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user_id` as online on `session_id`
    ///
    /// Returns the entry this replaced, if the user was already online.
    pub fn register(&self, user_id: UserId, session_id: &str) -> Option<PresenceEntry> {
        let now = Utc::now();
        let mut entries = self.entries.write();

        // A session re-identifying as someone else gives up its old identity
        entries.retain(|user, entry| *user == user_id || entry.session_id != session_id);

        entries.insert(
            user_id.clone(),
            PresenceEntry {
                user_id,
                session_id: session_id.to_string(),
                connected_at: now,
                last_seen: now,
            },
        )
    }

    /// Refresh a user's last-seen time
    ///
    /// Returns false (and does nothing) if the user is not online.
    pub fn touch(&self, user_id: &UserId) -> bool {
        match self.entries.write().get_mut(user_id) {
            Some(entry) => {
                entry.last_seen = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Remove the entry bound to `session_id`
    ///
    /// Returns the user that went offline, if any.
    pub fn unregister(&self, session_id: &str) -> Option<UserId> {
        let mut entries = self.entries.write();
        let user_id = entries
            .values()
            .find(|entry| entry.session_id == session_id)
            .map(|entry| entry.user_id.clone())?;
        entries.remove(&user_id);
        Some(user_id)
    }

    /// All online users, sorted by id
    #[must_use]
    pub fn list_online(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.entries.read().keys().cloned().collect();
        users.sort();
        users
    }

    /// Snapshot of a user's entry
    #[must_use]
    pub fn get(&self, user_id: &UserId) -> Option<PresenceEntry> {
        self.entries.read().get(user_id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
