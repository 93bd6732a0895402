//! Message delivery pipeline
//!
//! Fans an already-persisted message out to its chat. Steps run in order and
//! the first failing step aborts the rest:
//!
//! 1. touch the sender's presence entry
//! 2. `message_delivered` to the sender's personal room
//! 3. `message_received` to the chat room, except the origin connection
//! 4. `message_delivered` to the chat room, except the origin connection and
//!    the sender's personal room (already covered by step 2)

use super::{HandlerError, HandlerResult};
use crate::broadcast::{Broadcast, BroadcastError};
use crate::connection::Connection;
use crate::events::{MessageDeliveredPayload, ServerEvent};
use crate::server::GatewayState;
use chat_core::MessageEnvelope;
use std::sync::Arc;

/// Handles `new_message`
pub struct MessageHandler;

impl MessageHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        envelope: MessageEnvelope,
    ) -> HandlerResult<()> {
        let MessageEnvelope {
            message_id,
            chat_id,
            sender_id,
            payload,
        } = envelope;

        let origin = connection.session_id();
        let dispatcher = state.event_dispatcher();
        let failed = |source: BroadcastError| HandlerError::Delivery {
            sender_id: sender_id.clone(),
            message_id: message_id.clone(),
            source,
        };

        state.presence().touch(&sender_id);

        let delivered = ServerEvent::MessageDelivered(MessageDeliveredPayload {
            message_id: message_id.clone(),
        });

        dispatcher
            .emit(&Broadcast::to(sender_id.clone()), &delivered)
            .map_err(failed)?;

        let received = dispatcher
            .emit(
                &Broadcast::to(chat_id.clone()).except(origin),
                &ServerEvent::MessageReceived(payload),
            )
            .map_err(failed)?;

        dispatcher
            .emit(
                &Broadcast::to(chat_id.clone())
                    .except(origin)
                    .except_room(sender_id.clone()),
                &delivered,
            )
            .map_err(failed)?;

        tracing::debug!(
            session_id = %origin,
            chat_id = %chat_id,
            user_id = %sender_id,
            message_id = ?message_id.as_ref().map(chat_core::MessageId::as_str),
            recipients = received,
            "Message fanned out"
        );

        Ok(())
    }
}
