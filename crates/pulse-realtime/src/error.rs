//! Realtime layer errors

use std::time::Duration;
use thiserror::Error;

/// Wire decoding and encoding failures
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Empty frame")]
    Empty,

    #[error("Unknown packet type: {0:?}")]
    UnknownPacketType(char),

    #[error("Unsupported packet: {0}")]
    Unsupported(&'static str),

    #[error("Packet for foreign namespace: {0}")]
    Namespace(String),

    #[error("Event packet without a name")]
    MissingEventName,

    #[error("Ack packet without an id")]
    MissingAckId,

    #[error("Invalid ack id: {0}")]
    InvalidAckId(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Invalid payload for {event}: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures establishing or running the underlying connection
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid realtime URL: {0}")]
    InvalidUrl(String),

    #[error("Connect attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// The server answered the connect request with a connect error (usually auth)
    #[error("Connection rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl TransportError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::Timeout(_) => "timeout",
            Self::WebSocket(_) => "websocket",
            Self::Handshake(_) => "handshake",
            Self::Rejected(_) => "rejected",
            Self::Protocol(_) => "protocol",
        }
    }
}

/// Failures of operations performed through a channel handle
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel is not connected")]
    NotConnected,

    #[error("Channel was closed")]
    Closed,

    #[error("No acknowledgement within {0:?}")]
    AckTimeout(Duration),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ChannelError {
    /// Whether the HTTP fallback is worth trying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotConnected | Self::Closed | Self::AckTimeout(_))
    }
}

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;
