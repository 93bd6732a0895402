//! Gateway protocol definitions
//!
//! Every WebSocket text frame carries one JSON event frame. Frames sent by
//! the server are numbered per connection.

mod close_codes;
mod frame;

pub use close_codes::CloseCode;
pub use frame::EventFrame;
