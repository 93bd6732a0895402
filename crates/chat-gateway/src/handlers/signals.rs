//! Seen and typing relay
//!
//! Stateless: each signal is re-broadcast to the chat room as soon as it
//! arrives.

use super::HandlerResult;
use crate::broadcast::Broadcast;
use crate::connection::Connection;
use crate::events::{SeenSignal, SeenUpdatePayload, ServerEvent, TypingPayload, TypingSignal};
use crate::server::GatewayState;
use chrono::Utc;
use std::sync::Arc;

/// Handles `message_seen`, `typing`, and `stop_typing`
pub struct SignalHandler;

impl SignalHandler {
    /// Relay a read receipt to the whole chat room, origin included
    pub async fn seen(state: &GatewayState, signal: SeenSignal) -> HandlerResult<()> {
        let SeenSignal {
            message_id,
            chat_id,
            user_id,
        } = signal;

        tracing::debug!(
            chat_id = %chat_id,
            message_id = %message_id,
            user_id = %user_id,
            "Message seen"
        );

        let event = ServerEvent::MessageSeenUpdate(SeenUpdatePayload {
            message_id,
            seen_by: user_id,
            timestamp: Utc::now(),
        });
        state.event_dispatcher().emit(&Broadcast::to(chat_id), &event)?;

        Ok(())
    }

    /// Relay `typing` to the rest of the chat room
    pub async fn typing(
        state: &GatewayState,
        connection: &Arc<Connection>,
        signal: TypingSignal,
    ) -> HandlerResult<()> {
        let target = Self::rest_of_room(connection, &signal);
        Self::relay(state, &target, &ServerEvent::Typing(Self::payload(signal)))
    }

    /// Relay `stop_typing` to the rest of the chat room
    pub async fn stop_typing(
        state: &GatewayState,
        connection: &Arc<Connection>,
        signal: TypingSignal,
    ) -> HandlerResult<()> {
        let target = Self::rest_of_room(connection, &signal);
        Self::relay(state, &target, &ServerEvent::StopTyping(Self::payload(signal)))
    }

    fn rest_of_room(connection: &Connection, signal: &TypingSignal) -> Broadcast {
        tracing::trace!(
            session_id = %connection.session_id(),
            chat_id = %signal.chat_id,
            user_id = %signal.user_id,
            "Relaying typing signal"
        );
        Broadcast::to(signal.chat_id.clone()).except(connection.session_id())
    }

    fn payload(signal: TypingSignal) -> TypingPayload {
        TypingPayload {
            chat_id: signal.chat_id,
            user_id: signal.user_id,
        }
    }

    fn relay(state: &GatewayState, target: &Broadcast, event: &ServerEvent) -> HandlerResult<()> {
        state.event_dispatcher().emit(target, event)?;
        Ok(())
    }
}
