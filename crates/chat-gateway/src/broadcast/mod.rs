//! Event broadcasting
//!
//! Routes server events to connections by room, session, or to everyone.

mod dispatcher;
mod target;

pub use dispatcher::{BroadcastError, EventDispatcher};
pub use target::Broadcast;
