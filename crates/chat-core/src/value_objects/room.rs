//! Broadcast room identity

use super::{ChatId, UserId};
use std::fmt;

/// A broadcast group connections can join
///
/// Personal rooms and chat rooms live in separate namespaces, so a user id
/// can never address a chat room by accident.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// Personal room of a single user, used for unicast-like delivery
    User(UserId),
    /// Room of a two-party chat
    Chat(ChatId),
}

impl From<UserId> for RoomId {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}

impl From<ChatId> for RoomId {
    fn from(id: ChatId) -> Self {
        Self::Chat(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Chat(id) => write!(f, "chat:{id}"),
        }
    }
}
