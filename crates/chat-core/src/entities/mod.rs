//! Domain entities

mod delivery;
mod envelope;
mod typing;

pub use delivery::{DeliveryLedger, DeliveryState};
pub use envelope::MessageEnvelope;
pub use typing::TypingState;
