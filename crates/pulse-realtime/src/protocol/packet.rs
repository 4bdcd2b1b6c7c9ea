//! Engine.IO v4 / Socket.IO v4 packet codec (text frames only)
//!
//! ```text
//! 0{"sid":..,"pingInterval":..}   open
//! 2 / 3                           ping / pong
//! 40{"token":".."}                socket connect (client auth)
//! 42["event",{..}]                event
//! 4212["event",{..}]              event expecting ack 12
//! 4312[{..}]                      ack 12
//! 44{"message":".."}              connect error
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ProtocolError;

/// Engine.IO open handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    // Engine.IO
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,

    // Socket.IO
    /// Client auth on the way out, server sid on the way in
    Connect(Option<Value>),
    Disconnect,
    Event {
        ack: Option<u64>,
        name: String,
        data: Vec<Value>,
    },
    Ack {
        id: u64,
        data: Vec<Value>,
    },
    ConnectError(String),
}

impl Packet {
    /// Event packet with a single payload argument
    pub fn event(name: impl Into<String>, payload: Value, ack: Option<u64>) -> Self {
        let data = if payload.is_null() { Vec::new() } else { vec![payload] };
        Self::Event {
            ack,
            name: name.into(),
            data,
        }
    }

    /// Encode to a text frame
    pub fn encode(&self) -> String {
        match self {
            Self::Open(handshake) => format!("0{}", json_or_empty(handshake)),
            Self::Close => "1".to_string(),
            Self::Ping => "2".to_string(),
            Self::Pong => "3".to_string(),
            Self::Noop => "6".to_string(),
            Self::Connect(None) => "40".to_string(),
            Self::Connect(Some(auth)) => format!("40{auth}"),
            Self::Disconnect => "41".to_string(),
            Self::Event { ack, name, data } => {
                let mut args = Vec::with_capacity(data.len() + 1);
                args.push(Value::String(name.clone()));
                args.extend(data.iter().cloned());
                format!("42{}{}", ack_prefix(*ack), Value::Array(args))
            }
            Self::Ack { id, data } => format!("43{id}{}", Value::Array(data.clone())),
            Self::ConnectError(message) => {
                format!("44{}", serde_json::json!({ "message": message }))
            }
        }
    }

    /// Decode a text frame
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let body = chars.as_str();

        match kind {
            '0' => Ok(Self::Open(serde_json::from_str(body)?)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping),
            '3' => Ok(Self::Pong),
            '4' => decode_socket(body),
            '5' => Err(ProtocolError::Unsupported("transport upgrade")),
            '6' => Ok(Self::Noop),
            other => Err(ProtocolError::UnknownPacketType(other)),
        }
    }

    /// Whether the packet belongs to the Engine.IO layer
    pub fn is_transport_level(&self) -> bool {
        matches!(
            self,
            Self::Open(_) | Self::Close | Self::Ping | Self::Pong | Self::Noop
        )
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event { name, ack, .. } => match ack {
                Some(id) => write!(f, "event({name}, ack={id})"),
                None => write!(f, "event({name})"),
            },
            Self::Ack { id, .. } => write!(f, "ack({id})"),
            Self::Open(_) => f.write_str("open"),
            Self::Close => f.write_str("close"),
            Self::Ping => f.write_str("ping"),
            Self::Pong => f.write_str("pong"),
            Self::Noop => f.write_str("noop"),
            Self::Connect(_) => f.write_str("connect"),
            Self::Disconnect => f.write_str("disconnect"),
            Self::ConnectError(msg) => write!(f, "connect_error({msg})"),
        }
    }
}

fn json_or_empty(value: &impl Serialize) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn ack_prefix(ack: Option<u64>) -> String {
    ack.map(|id| id.to_string()).unwrap_or_default()
}

fn decode_socket(body: &str) -> Result<Packet, ProtocolError> {
    let mut chars = body.chars();
    let kind = chars.next().ok_or(ProtocolError::Empty)?;
    let mut rest = chars.as_str();

    if matches!(kind, '5' | '6') {
        return Err(ProtocolError::Unsupported("binary packet"));
    }

    if rest.starts_with('/') {
        let end = rest.find(',').unwrap_or(rest.len());
        let namespace = &rest[..end];
        if namespace != "/" {
            return Err(ProtocolError::Namespace(namespace.to_string()));
        }
        rest = rest.get(end + 1..).unwrap_or("");
    }

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let ack = if digits == 0 {
        None
    } else {
        let raw = &rest[..digits];
        Some(
            raw.parse::<u64>()
                .map_err(|_| ProtocolError::InvalidAckId(raw.to_string()))?,
        )
    };
    rest = &rest[digits..];

    match kind {
        '0' => {
            let payload = if rest.is_empty() {
                None
            } else {
                Some(serde_json::from_str(rest)?)
            };
            Ok(Packet::Connect(payload))
        }
        '1' => Ok(Packet::Disconnect),
        '2' => {
            let mut args: Vec<Value> = serde_json::from_str(rest)?;
            if args.is_empty() {
                return Err(ProtocolError::MissingEventName);
            }
            let Value::String(name) = args.remove(0) else {
                return Err(ProtocolError::MissingEventName);
            };
            Ok(Packet::Event {
                ack,
                name,
                data: args,
            })
        }
        '3' => {
            let id = ack.ok_or(ProtocolError::MissingAckId)?;
            let data = if rest.is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(rest)?
            };
            Ok(Packet::Ack { id, data })
        }
        '4' => Ok(Packet::ConnectError(connect_error_message(rest))),
        other => Err(ProtocolError::UnknownPacketType(other)),
    }
}

fn connect_error_message(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| raw.to_string(), ToString::to_string),
        Ok(Value::String(message)) => message,
        _ => raw.to_string(),
    }
}
