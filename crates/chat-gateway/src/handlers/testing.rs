//! Shared fixtures for handler tests

use super::LifecycleHandler;
use crate::connection::{Connection, Outbound};
use crate::events::EventName;
use crate::server::GatewayState;
use chat_common::AppConfig;
use chat_core::{ChatId, UserId};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn test_state() -> GatewayState {
    GatewayState::new(AppConfig::from_lookup(|_| None).unwrap())
}

pub fn connect(
    state: &GatewayState,
    session_id: &str,
    capacity: usize,
) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
    let (tx, rx) = mpsc::channel(capacity);
    let connection = state
        .connection_manager()
        .add_connection(session_id.to_string(), tx);
    (connection, rx)
}

/// Connect, run `setup`, optionally join a chat, and discard the output
pub async fn identified(
    state: &GatewayState,
    session_id: &str,
    user: &str,
    chat: Option<&str>,
) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
    let (connection, mut rx) = connect(state, session_id, 10);
    LifecycleHandler::setup(state, &connection, UserId::parse(user).unwrap())
        .await
        .unwrap();
    if let Some(chat) = chat {
        LifecycleHandler::join_chat(state, &connection, ChatId::parse(chat).unwrap())
            .await
            .unwrap();
    }
    drain(&mut rx);
    (connection, rx)
}

/// Everything queued so far, in order
pub fn drain(rx: &mut mpsc::Receiver<Outbound>) -> Vec<(EventName, Value)> {
    let mut events = Vec::new();
    while let Ok(item) = rx.try_recv() {
        if let Outbound::Event { event, data } = item {
            events.push((event, data));
        }
    }
    events
}

pub fn names(events: &[(EventName, Value)]) -> Vec<EventName> {
    events.iter().map(|(event, _)| *event).collect()
}
