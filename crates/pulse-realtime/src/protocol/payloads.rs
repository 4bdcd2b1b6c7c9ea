//! Event payload structures

use pulse_core::{
    Message, MessageId, MessageReactions, NotificationId, PostId, ReadReceiptSet, RoomId, TempId,
    TypingUser, UserId,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Shared references
// ============================================================================

/// `{messageId, roomId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub message_id: MessageId,
    pub room_id: RoomId,
}

impl MessageRef {
    pub fn new(message_id: impl Into<MessageId>, room_id: impl Into<RoomId>) -> Self {
        Self {
            message_id: message_id.into(),
            room_id: room_id.into(),
        }
    }
}

/// `{roomId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: RoomId,
}

/// `{userId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: UserId,
}

// ============================================================================
// Outbound
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReactionPayload {
    pub message_id: MessageId,
    pub room_id: RoomId,
    /// Emoji content
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembersPayload {
    pub room_id: RoomId,
    pub user_ids: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberPayload {
    pub room_id: RoomId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationPayload {
    pub recipient_id: UserId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRef {
    pub notification_id: NotificationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIdsPayload {
    pub notification_ids: Vec<NotificationId>,
}

// ============================================================================
// Inbound
// ============================================================================

/// `receive_message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveMessagePayload {
    pub room_id: RoomId,
    pub new_message: Message,
    /// Echo of the client's optimistic id when this confirms the user's own send
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<TempId>,
}

impl ReceiveMessagePayload {
    /// The message with its room filled in from the envelope
    pub fn message(&self) -> Message {
        let mut message = self.new_message.clone();
        if message.room_id.is_empty() {
            message.room_id = self.room_id.clone();
        }
        message
    }
}

/// `message_reaction_update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionUpdatePayload {
    pub message_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub reactions: MessageReactions,
}

/// `message_read_update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadUpdatePayload {
    pub message_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub reads: ReadReceiptSet,
}

/// `room_unread_count_update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUnreadPayload {
    pub room_id: RoomId,
    pub unread_count: u64,
}

/// `typing_update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUpdatePayload {
    pub room_id: RoomId,
    #[serde(default)]
    pub typing_users: Vec<TypingUser>,
}

/// `notifications_unread_update` and `rooms_unreads_update`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountPayload {
    pub unread_count: u64,
}

/// `notification_deleted`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDeletedPayload {
    #[serde(default, alias = "id", alias = "_id")]
    pub notification_id: Option<NotificationId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
