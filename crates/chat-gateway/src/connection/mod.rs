//! Connection management
//!
//! Manages WebSocket connections and room membership.

mod connection;
mod manager;

pub use connection::{generate_session_id, Connection, ConnectionState, Outbound, PushError};
pub use manager::ConnectionManager;
