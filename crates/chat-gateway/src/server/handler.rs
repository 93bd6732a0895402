//! WebSocket handler
//!
//! Each connection runs three tasks: a receive task that handles inbound
//! frames strictly in order, a send task that drains the outbound queue and
//! pings the client, and a heartbeat task that closes silent connections.

use crate::connection::{generate_session_id, Connection, Outbound};
use crate::handlers::{EventRouter, LifecycleHandler};
use crate::protocol::CloseCode;
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

/// How long a queued close frame is given to reach the client
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let session_id = generate_session_id();
    let realtime = state.config().realtime.clone();

    // Create message channel for outgoing events
    let (tx, rx) = mpsc::channel::<Outbound>(realtime.outbound_buffer);

    // Register connection
    let connection = state
        .connection_manager()
        .add_connection(session_id.clone(), tx);

    tracing::info!(session_id = %session_id, "WebSocket connection established");

    let (ws_sink, mut ws_stream) = socket.split();

    // Receive task: inbound frames, one at a time
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        let session_id = connection_recv.session_id().to_string();

        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    connection_recv.record_activity().await;
                    EventRouter::route(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(session_id = %session_id, "Binary frames are not supported");
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong replies are handled automatically by axum
                    connection_recv.record_activity().await;
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %session_id, "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(session_id = %session_id, error = %e, "WebSocket error");
                    return None;
                }
            }
        }
        None
    });

    // Send task: outbound queue plus periodic pings
    let connection_send = connection.clone();
    let ping_every = realtime.heartbeat_interval();
    let mut send_task = tokio::spawn(send_loop(connection_send, ws_sink, rx, ping_every));

    // Heartbeat task: close connections that have gone silent
    let connection_hb = connection.clone();
    let timeout = realtime.heartbeat_timeout();
    let mut heartbeat_task = tokio::spawn(async move {
        let mut check_interval = interval(ping_every / 2);
        check_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            check_interval.tick().await;

            let time_since = connection_hb.time_since_activity().await;
            if time_since > timeout {
                tracing::warn!(
                    session_id = %connection_hb.session_id(),
                    time_since_ms = time_since.as_millis(),
                    "Connection timed out"
                );
                return connection_hb.close(CloseCode::SessionTimeout);
            }
        }
    });

    // Wait for the connection to end
    tokio::select! {
        result = &mut recv_task => {
            if let Ok(Some(close_code)) = result {
                tracing::debug!(
                    session_id = %session_id,
                    close_code = %close_code,
                    "Closing connection"
                );
                if connection.close(close_code).is_ok() {
                    flush_close(&session_id, &mut send_task).await;
                }
            }
        }
        _ = &mut send_task => {
            tracing::debug!(session_id = %session_id, "Send task ended");
        }
        queued = &mut heartbeat_task => {
            if matches!(queued, Ok(Ok(()))) {
                flush_close(&session_id, &mut send_task).await;
            }
        }
    }

    recv_task.abort();
    send_task.abort();
    heartbeat_task.abort();

    // A handler still running in the receive task must finish before cleanup
    if !recv_task.is_finished() {
        let _ = recv_task.await;
    }

    LifecycleHandler::disconnect(&state, &session_id).await;

    tracing::info!(
        session_id = %session_id,
        connected_for_ms = connection.age().as_millis(),
        "WebSocket connection closed"
    );
}

/// Drain the outbound queue to the socket, pinging on every interval tick
async fn send_loop(
    connection: Arc<Connection>,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outbound>,
    ping_every: Duration,
) {
    let session_id = connection.session_id().to_string();
    let mut ping = interval(ping_every);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ping.tick().await;

    loop {
        let message = tokio::select! {
            item = rx.recv() => match item {
                Some(Outbound::Event { event, data }) => {
                    let frame = connection.sequence_frame(event, data);
                    match frame.to_json() {
                        Ok(json) => Message::Text(json),
                        Err(e) => {
                            tracing::error!(
                                session_id = %session_id,
                                event = %event,
                                error = %e,
                                "Failed to encode frame"
                            );
                            continue;
                        }
                    }
                }
                Some(Outbound::Close(code)) => {
                    let frame = CloseFrame {
                        code: code.as_u16(),
                        reason: code.description().into(),
                    };
                    if let Err(e) = ws_sink.send(Message::Close(Some(frame))).await {
                        tracing::debug!(session_id = %session_id, error = %e, "Failed to send close frame");
                    }
                    return;
                }
                None => break,
            },
            _ = ping.tick() => Message::Ping(Vec::new()),
        };

        if ws_sink.send(message).await.is_err() {
            tracing::warn!(session_id = %session_id, "Failed to send message to WebSocket");
            return;
        }
    }

    // Close the WebSocket when channel is closed
    let _ = ws_sink.close().await;
}

async fn flush_close(session_id: &str, send_task: &mut tokio::task::JoinHandle<()>) {
    if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, send_task).await.is_err() {
        tracing::debug!(session_id = %session_id, "Close frame not flushed in time");
    }
}
