//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP requests, and
//! driving gateway connections.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use chat_common::AppConfig;
use chat_gateway::{run_server, GatewayState};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long to wait for an expected frame
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with default settings
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config(&[])?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        // Ephemeral port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = GatewayState::new(config);

        // Spawn server task
        let handle = tokio::spawn(async move {
            run_server(listener, state).await.ok();
        });

        // Create HTTP client
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the gateway WebSocket URL
    pub fn ws_url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Open a gateway connection
    pub async fn connect(&self) -> Result<WsClient> {
        let (stream, _) = connect_async(self.ws_url())
            .await
            .context("WebSocket handshake failed")?;
        Ok(WsClient {
            stream,
            last_sequence: 0,
        })
    }

    /// Open a gateway connection and identify it as `user_id`
    ///
    /// Consumes the `online_users` broadcast triggered by the setup.
    pub async fn connect_as(&self, user_id: &str) -> Result<WsClient> {
        let mut client = self.connect().await?;
        client.emit("setup", json!(user_id)).await?;
        client.expect_event("online_users").await?;
        Ok(client)
    }
}

/// Create a test configuration from explicit overrides
///
/// Never reads the process environment, so tests are hermetic.
pub fn test_config(overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let overrides: Vec<(String, String)> = overrides
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();

    AppConfig::from_lookup(|key| {
        overrides
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// A server event as received by a client
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub event: String,
    pub sequence: u64,
    pub data: Value,
}

/// Gateway client speaking the JSON event protocol
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    last_sequence: u64,
}

impl WsClient {
    /// Send an event; `Value::Null` sends no data
    pub async fn emit(&mut self, event: &str, data: Value) -> Result<()> {
        let frame = if data.is_null() {
            json!({ "event": event })
        } else {
            json!({ "event": event, "data": data })
        };
        self.send_raw(Message::Text(frame.to_string())).await
    }

    /// Send an arbitrary WebSocket message
    pub async fn send_raw(&mut self, message: Message) -> Result<()> {
        self.stream.send(message).await?;
        Ok(())
    }

    /// Wait for the next server event
    ///
    /// Checks that sequence numbers arrive without gaps.
    pub async fn next_event(&mut self) -> Result<Received> {
        loop {
            let message = tokio::time::timeout(EVENT_TIMEOUT, self.stream.next())
                .await
                .context("timed out waiting for an event")?;

            match message {
                Some(Ok(Message::Text(text))) => {
                    let frame: Value = serde_json::from_str(&text)?;
                    let event = frame["event"]
                        .as_str()
                        .context("frame without event name")?
                        .to_string();
                    let sequence = frame["s"].as_u64().context("frame without sequence")?;

                    ensure!(
                        sequence == self.last_sequence + 1,
                        "sequence gap: expected {}, got {sequence}",
                        self.last_sequence + 1
                    );
                    self.last_sequence = sequence;

                    return Ok(Received {
                        event,
                        sequence,
                        data: frame.get("data").cloned().unwrap_or(Value::Null),
                    });
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(other)) => bail!("unexpected message: {other:?}"),
                Some(Err(e)) => return Err(e.into()),
                None => bail!("connection closed"),
            }
        }
    }

    /// Wait for the next event and check its name
    pub async fn expect_event(&mut self, name: &str) -> Result<Value> {
        let received = self.next_event().await?;
        ensure!(
            received.event == name,
            "expected {name}, got {} with {}",
            received.event,
            received.data
        );
        Ok(received.data)
    }

    /// Wait for the next event and decode its data
    pub async fn expect_data<T: DeserializeOwned>(&mut self, name: &str) -> Result<T> {
        Ok(serde_json::from_value(self.expect_event(name).await?)?)
    }

    /// Round-trip `get_online_users` and return every event queued before
    /// the reply
    ///
    /// Because each connection's frames are handled in order and fan-out is
    /// queued before the handler returns, everything this connection caused
    /// has been delivered once this returns. Only call it when no
    /// `online_users` broadcast is pending for this connection.
    pub async fn sync(&mut self) -> Result<Vec<Received>> {
        self.emit("get_online_users", Value::Null).await?;

        let mut before = Vec::new();
        loop {
            let received = self.next_event().await?;
            if received.event == "online_users" {
                return Ok(before);
            }
            before.push(received);
        }
    }

    /// Wait for the server to close the connection and return its close code
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            let message = tokio::time::timeout(EVENT_TIMEOUT, self.stream.next())
                .await
                .context("timed out waiting for close")?;

            match message {
                Some(Ok(Message::Close(frame))) => return Ok(frame.map(|f| u16::from(f.code))),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }

    /// Close the connection from the client side
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}
