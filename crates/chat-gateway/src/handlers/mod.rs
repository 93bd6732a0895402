//! Event handlers
//!
//! Every inbound frame passes through [`EventRouter::route`], which decodes
//! it, hands it to the matching handler, and is the one place handler errors
//! are logged. Nothing a handler returns reaches the transport.

mod error;
mod lifecycle;
mod message;
mod signals;

#[cfg(test)]
mod testing;

pub use error::{HandlerError, HandlerResult};
pub use lifecycle::LifecycleHandler;
pub use message::MessageHandler;
pub use signals::SignalHandler;

use crate::broadcast::Broadcast;
use crate::connection::Connection;
use crate::events::{ClientEvent, MessageErrorPayload, ServerEvent};
use crate::protocol::EventFrame;
use crate::server::GatewayState;
use std::sync::Arc;

/// Routes client events to their handlers
pub struct EventRouter;

impl EventRouter {
    /// Handle one text frame from a client
    pub async fn route(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
        let result = match EventFrame::from_json(text) {
            Ok(frame) => {
                tracing::trace!(
                    session_id = %connection.session_id(),
                    event = %frame.event,
                    "Received event"
                );
                match ClientEvent::from_frame(frame) {
                    Ok(event) => Self::dispatch(state, connection, event).await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e.into()),
        };

        if let Err(err) = result {
            Self::report(state, connection, &err);
        }
    }

    /// Run the handler for a decoded event
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        event: ClientEvent,
    ) -> HandlerResult<()> {
        match event {
            ClientEvent::Setup { user_id } => LifecycleHandler::setup(state, connection, user_id).await,
            ClientEvent::JoinChat { chat_id } => {
                LifecycleHandler::join_chat(state, connection, chat_id).await
            }
            ClientEvent::UserActivity { user_id } => {
                LifecycleHandler::activity(state, &user_id);
                Ok(())
            }
            ClientEvent::GetOnlineUsers => LifecycleHandler::send_online_users(state, connection),
            ClientEvent::NewMessage(envelope) => {
                MessageHandler::handle(state, connection, envelope).await
            }
            ClientEvent::MessageSeen(signal) => SignalHandler::seen(state, signal).await,
            ClientEvent::Typing(signal) => SignalHandler::typing(state, connection, signal).await,
            ClientEvent::StopTyping(signal) => {
                SignalHandler::stop_typing(state, connection, signal).await
            }
        }
    }

    /// Log a handler error; a failed delivery is also reported to its sender
    fn report(state: &GatewayState, connection: &Connection, err: &HandlerError) {
        match err {
            HandlerError::Delivery {
                sender_id,
                message_id,
                source,
            } => {
                tracing::error!(
                    session_id = %connection.session_id(),
                    user_id = %sender_id,
                    message_id = ?message_id.as_ref().map(chat_core::MessageId::as_str),
                    error = %source,
                    "Message delivery failed"
                );

                let event =
                    ServerEvent::MessageError(MessageErrorPayload::delivery_failed(message_id.clone()));
                if let Err(e) = state
                    .event_dispatcher()
                    .emit(&Broadcast::to(sender_id.clone()), &event)
                {
                    tracing::error!(
                        user_id = %sender_id,
                        error = %e,
                        "Failed to report delivery failure to sender"
                    );
                }
            }
            e if e.is_client_error() => {
                tracing::warn!(
                    session_id = %connection.session_id(),
                    code = e.code(),
                    error = %e,
                    "Dropped client event"
                );
            }
            e => {
                tracing::error!(
                    session_id = %connection.session_id(),
                    code = e.code(),
                    error = %e,
                    "Event handling failed"
                );
            }
        }
    }
}
