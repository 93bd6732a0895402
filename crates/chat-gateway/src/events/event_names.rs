//! Gateway event names
//!
//! Defines every event name that may appear in the `event` field of a frame.

use std::fmt;

/// Gateway event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    // Client → server
    /// Identify the connection as a user
    Setup,
    /// Subscribe to a chat room
    JoinChat,
    /// Fan out an already-persisted message
    NewMessage,
    /// A message was read
    MessageSeen,
    /// Record activity for last-seen tracking
    UserActivity,
    /// Ask for the current presence list
    GetOnlineUsers,

    // Both directions
    /// User started typing
    Typing,
    /// User stopped typing
    StopTyping,

    // Server → client
    /// Full presence list
    OnlineUsers,
    /// Message pushed to chat recipients
    MessageReceived,
    /// Server has fanned a message out
    MessageDelivered,
    /// Message could not be delivered
    MessageError,
    /// Read receipt
    MessageSeenUpdate,
}

impl EventName {
    /// Get the wire name of the event
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::JoinChat => "join_chat",
            Self::NewMessage => "new_message",
            Self::MessageSeen => "message_seen",
            Self::UserActivity => "user_activity",
            Self::GetOnlineUsers => "get_online_users",
            Self::Typing => "typing",
            Self::StopTyping => "stop_typing",
            Self::OnlineUsers => "online_users",
            Self::MessageReceived => "message_received",
            Self::MessageDelivered => "message_delivered",
            Self::MessageError => "message_error",
            Self::MessageSeenUpdate => "message_seen_update",
        }
    }

    /// Parse an event name from its wire form
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "setup" => Some(Self::Setup),
            "join_chat" => Some(Self::JoinChat),
            "new_message" => Some(Self::NewMessage),
            "message_seen" => Some(Self::MessageSeen),
            "user_activity" => Some(Self::UserActivity),
            "get_online_users" => Some(Self::GetOnlineUsers),
            "typing" => Some(Self::Typing),
            "stop_typing" => Some(Self::StopTyping),
            "online_users" => Some(Self::OnlineUsers),
            "message_received" => Some(Self::MessageReceived),
            "message_delivered" => Some(Self::MessageDelivered),
            "message_error" => Some(Self::MessageError),
            "message_seen_update" => Some(Self::MessageSeenUpdate),
            _ => None,
        }
    }

    /// Check if clients may send this event
    #[must_use]
    pub const fn is_client_event(self) -> bool {
        matches!(
            self,
            Self::Setup
                | Self::JoinChat
                | Self::NewMessage
                | Self::MessageSeen
                | Self::UserActivity
                | Self::GetOnlineUsers
                | Self::Typing
                | Self::StopTyping
        )
    }

}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EventName> for String {
    fn from(event: EventName) -> Self {
        event.as_str().to_string()
    }
}
