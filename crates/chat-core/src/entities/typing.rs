//! Typing indicators, as tracked by a client from `typing` / `stop_typing` events

use crate::{ChatId, UserId};
use std::collections::{BTreeSet, HashMap};

/// Users currently typing, per chat
#[derive(Debug, Clone, Default)]
pub struct TypingState {
    chats: HashMap<ChatId, BTreeSet<UserId>>,
}

impl TypingState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a user started typing. Returns true if this is new.
    pub fn start(&mut self, chat_id: ChatId, user_id: UserId) -> bool {
        self.chats.entry(chat_id).or_default().insert(user_id)
    }

    /// Record that a user stopped typing. Returns true if they were typing.
    pub fn stop(&mut self, chat_id: &ChatId, user_id: &UserId) -> bool {
        let Some(users) = self.chats.get_mut(chat_id) else {
            return false;
        };
        let removed = users.remove(user_id);
        if users.is_empty() {
            self.chats.remove(chat_id);
        }
        removed
    }

    /// Check if a user is typing in a chat
    #[must_use]
    pub fn is_typing(&self, chat_id: &ChatId, user_id: &UserId) -> bool {
        self.chats
            .get(chat_id)
            .is_some_and(|users| users.contains(user_id))
    }

    /// Users typing in a chat, in id order
    #[must_use]
    pub fn typing_in(&self, chat_id: &ChatId) -> Vec<&UserId> {
        self.chats
            .get(chat_id)
            .map(|users| users.iter().collect())
            .unwrap_or_default()
    }
}
