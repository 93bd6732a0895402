//! Gateway events
//!
//! Client events are decoded from inbound frames; server events are encoded
//! into outbound frames by the broadcast engine.

mod client;
mod event_names;
mod server;

pub use client::{ClientEvent, SeenSignal, TypingSignal};
pub use event_names::EventName;
pub use server::{
    MessageDeliveredPayload, MessageErrorPayload, SeenUpdatePayload, ServerEvent, TypingPayload,
    DELIVERY_FAILED_REASON,
};
