//! Online presence tracking

mod registry;

pub use registry::{PresenceEntry, PresenceRegistry};
