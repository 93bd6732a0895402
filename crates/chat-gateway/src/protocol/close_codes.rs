//! WebSocket close codes
//!
//! Close codes the gateway sends when it ends a connection itself.

/// Gateway WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    /// Server is shutting down
    GoingAway = 1001,
    /// Frame could not be decoded (binary frames are not part of the protocol)
    DecodeError = 4002,
    /// No traffic from the client within the liveness timeout
    SessionTimeout = 4009,
}

impl CloseCode {
    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Human-readable reason sent in the close frame
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::GoingAway => "Server shutting down",
            Self::DecodeError => "Invalid payload encoding",
            Self::SessionTimeout => "Connection timed out",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_u16(), self.description())
    }
}
