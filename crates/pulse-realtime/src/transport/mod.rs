//! Transport: the seam between the channel and the network

mod link;
mod websocket;

pub use link::{AuthPayload, Connector, Link, LinkEvent};
pub use websocket::WebSocketConnector;
