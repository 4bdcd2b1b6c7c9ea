//! Disconnect reasons, as reported by Socket.IO clients

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisconnectReason {
    /// The server sent a disconnect packet
    IoServerDisconnect,
    /// The client closed the channel deliberately
    IoClientDisconnect,
    /// No packet from the server within ping interval + ping timeout
    PingTimeout,
    /// The underlying connection closed
    TransportClose,
    /// The underlying connection failed
    TransportError,
}

impl DisconnectReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IoServerDisconnect => "io server disconnect",
            Self::IoClientDisconnect => "io client disconnect",
            Self::PingTimeout => "ping timeout",
            Self::TransportClose => "transport close",
            Self::TransportError => "transport error",
        }
    }

    /// Client-initiated disconnects are final; everything else is recoverable
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        !matches!(self, Self::IoClientDisconnect)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
