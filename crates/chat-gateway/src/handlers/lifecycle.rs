//! Connection lifecycle handler
//!
//! Identity (`setup`), room joins, activity, presence queries, and disconnect
//! cleanup.

use super::HandlerResult;
use crate::broadcast::Broadcast;
use crate::connection::{Connection, ConnectionState};
use crate::events::ServerEvent;
use crate::server::GatewayState;
use chat_core::{ChatId, RoomId, UserId};
use std::sync::Arc;

/// Handles connection lifecycle events
pub struct LifecycleHandler;

impl LifecycleHandler {
    /// Bind a connection to a user and announce the new presence list
    pub async fn setup(
        state: &GatewayState,
        connection: &Arc<Connection>,
        user_id: UserId,
    ) -> HandlerResult<()> {
        let session_id = connection.session_id();
        let manager = state.connection_manager();

        if !Self::is_live(state, connection).await {
            tracing::debug!(
                session_id = %session_id,
                user_id = %user_id,
                "Setup on closed connection ignored"
            );
            return Ok(());
        }

        if let Some(previous) = connection.identify(user_id.clone()).await {
            if previous != user_id {
                manager.leave_room(session_id, &RoomId::from(previous.clone())).await;
                tracing::debug!(
                    session_id = %session_id,
                    previous_user_id = %previous,
                    user_id = %user_id,
                    "Connection re-identified"
                );
            }
        }

        if let Some(replaced) = state.presence().register(user_id.clone(), session_id) {
            if replaced.session_id != session_id {
                tracing::debug!(
                    user_id = %user_id,
                    replaced_session_id = %replaced.session_id,
                    "Presence moved to newer connection"
                );
            }
        }

        // Teardown may have run since the liveness check
        if !manager.join_room(session_id, RoomId::from(user_id.clone())).await {
            state.presence().unregister(session_id);
            tracing::debug!(
                session_id = %session_id,
                user_id = %user_id,
                "Connection closed during setup"
            );
            return Ok(());
        }

        tracing::info!(session_id = %session_id, user_id = %user_id, "User online");

        Self::broadcast_online(state)
    }

    /// Subscribe a connection to a chat room
    pub async fn join_chat(
        state: &GatewayState,
        connection: &Arc<Connection>,
        chat_id: ChatId,
    ) -> HandlerResult<()> {
        if !Self::is_live(state, connection).await {
            return Ok(());
        }

        state
            .connection_manager()
            .join_room(connection.session_id(), RoomId::from(chat_id.clone()))
            .await;

        tracing::debug!(
            session_id = %connection.session_id(),
            chat_id = %chat_id,
            "Joined chat"
        );

        Ok(())
    }

    /// Refresh a user's last-seen time
    pub fn activity(state: &GatewayState, user_id: &UserId) {
        if !state.presence().touch(user_id) {
            tracing::trace!(user_id = %user_id, "Activity from user who is not online");
        }
    }

    /// Send the presence list to one connection
    pub fn send_online_users(state: &GatewayState, connection: &Connection) -> HandlerResult<()> {
        let event = ServerEvent::OnlineUsers(state.presence().list_online());
        state
            .event_dispatcher()
            .emit(&Broadcast::session(connection.session_id()), &event)?;
        Ok(())
    }

    /// Send the presence list to every connection
    pub fn broadcast_online(state: &GatewayState) -> HandlerResult<()> {
        let event = ServerEvent::OnlineUsers(state.presence().list_online());
        let sent = state.event_dispatcher().emit(&Broadcast::everyone(), &event)?;
        tracing::trace!(sent = sent, "Presence broadcast");
        Ok(())
    }

    async fn is_live(state: &GatewayState, connection: &Connection) -> bool {
        connection.state().await != ConnectionState::Disconnected
            && state.connection_manager().has_session(connection.session_id())
    }

    /// Tear down a closed connection
    ///
    /// Drops its presence entry and room memberships. The remaining
    /// connections get a new presence list only if a user went offline.
    pub async fn disconnect(state: &GatewayState, session_id: &str) {
        // Leave the manager first so a concurrent setup sees the session gone
        state.connection_manager().remove_connection(session_id).await;
        let offline = state.presence().unregister(session_id);

        match offline {
            Some(user_id) => {
                tracing::info!(session_id = %session_id, user_id = %user_id, "User offline");
                if let Err(e) = Self::broadcast_online(state) {
                    tracing::warn!(error = %e, "Failed to broadcast presence after disconnect");
                }
            }
            None => {
                tracing::debug!(session_id = %session_id, "Anonymous connection closed");
            }
        }
    }
}
