//! Connection state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the realtime channel as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No session, no channel
    #[default]
    Idle,
    /// First connect attempt in flight
    Connecting,
    /// Handshake complete, events flowing
    Connected,
    /// Connection lost or attempt failed; retrying with backoff
    Reconnecting,
    /// Gave up; waits for an explicit retry
    Disconnected,
}

impl ConnectionState {
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Whether the channel is working towards a connection on its own
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Connecting | Self::Reconnecting)
    }

    /// Label for the status indicator
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "online",
            Self::Reconnecting => "reconnecting",
            Self::Disconnected => "offline",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
