//! Message entity - a single entry in a room transcript

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSummary;
use crate::value_objects::{MessageId, RoomId, UserId};

/// Kind of message content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
    /// Generated by the server (member joined, room renamed, ...)
    System,
}

impl MessageKind {
    #[inline]
    pub const fn is_system(self) -> bool {
        matches!(self, Self::System)
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: MessageId,
    /// Empty when the payload omits it; `receive_message` carries the room id alongside
    #[serde(default)]
    pub room_id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    #[serde(default, rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub content: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a text message sent now
    pub fn text(
        id: impl Into<MessageId>,
        room_id: impl Into<RoomId>,
        sender: UserSummary,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            room_id: room_id.into(),
            sender: Some(sender),
            kind: MessageKind::Text,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a server-generated system message
    pub fn system(
        id: impl Into<MessageId>,
        room_id: impl Into<RoomId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            room_id: room_id.into(),
            sender: None,
            kind: MessageKind::System,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn sender_id(&self) -> Option<&UserId> {
        self.sender.as_ref().map(|s| &s.id)
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.kind.is_system()
    }

    /// Check whether the given user authored this message
    pub fn is_from(&self, user_id: &UserId) -> bool {
        self.sender_id() == Some(user_id)
    }
}
