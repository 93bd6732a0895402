//! # chat-core
//!
//! Domain layer for the direct-message realtime gateway: identifiers, the
//! message envelope relayed by the delivery pipeline, and the client-side
//! delivery/typing state models driven by gateway events.
//! This crate has zero dependencies on infrastructure (web framework, runtime, etc.).

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{DeliveryLedger, DeliveryState, MessageEnvelope, TypingState};
pub use error::DomainError;
pub use value_objects::{ChatId, MessageId, RoomId, UserId};
