//! Connector abstraction
//!
//! A connector turns credentials into a live [`Link`]: a Socket.IO session that has
//! completed its connect handshake. Transport keep-alive is handled below this seam, so
//! the link only carries Socket.IO packets.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::protocol::{DisconnectReason, Packet};

/// Credentials sent in the Socket.IO connect packet
#[derive(Clone, Serialize)]
pub struct AuthPayload {
    pub token: String,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Something that happened on an established link
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Packet(Packet),
    /// Terminal; nothing follows
    Closed(DisconnectReason),
}

/// An established connection
///
/// Dropping `outbound` closes the connection.
#[derive(Debug)]
pub struct Link {
    pub outbound: mpsc::Sender<Packet>,
    pub inbound: mpsc::Receiver<LinkEvent>,
}

#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a connection and complete the connect handshake
    async fn connect(&self, auth: &AuthPayload) -> Result<Link, TransportError>;
}
