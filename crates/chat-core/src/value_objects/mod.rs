//! Value objects - immutable types that represent domain concepts

mod ids;
mod room;

pub use ids::{ChatId, MessageId, UserId};
pub use room::RoomId;
