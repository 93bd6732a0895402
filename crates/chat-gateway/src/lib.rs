//! # chat-gateway
//!
//! Realtime core for two-party direct messaging over WebSocket: presence,
//! room membership, message fan-out, and seen/typing relay.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod presence;
pub mod protocol;
pub mod server;

pub use server::{create_app, run, run_server, GatewayState};
