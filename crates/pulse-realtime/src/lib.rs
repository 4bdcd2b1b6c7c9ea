//! # pulse-realtime
//!
//! The realtime channel: Socket.IO wire protocol, WebSocket transport, the connection
//! manager state machine, and routing of inbound events into the session caches.

pub mod channel;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod router;
pub mod transport;

pub use channel::ChannelHandle;
pub use connection::{ConnectionManager, ConnectionState, ReconnectPolicy, Session};
pub use error::{ChannelError, ChannelResult, ProtocolError, TransportError};
pub use protocol::{DisconnectReason, InboundEvent, InboundEventType, OutboundEvent, OutboundEventType};
pub use router::EventRouter;
pub use transport::{AuthPayload, Connector, Link, LinkEvent, WebSocketConnector};
