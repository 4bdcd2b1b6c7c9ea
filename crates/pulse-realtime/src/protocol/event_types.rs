//! Event names on the wire
//!
//! These strings are the contract with the server and must match it byte-for-byte.

use std::fmt;

/// Events the server pushes to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundEventType {
    // Messages
    ReceiveMessage,
    MessageReactionUpdate,
    MessageReadUpdate,
    MessageDeleted,

    // Rooms
    RoomUnreadCountUpdate,
    TypingUpdate,
    NewRoomCreated,
    RoomsUnreadsUpdate,

    // Presence
    UserOnline,
    UserOffline,
    UserStatusChange,

    // Notifications
    NotificationsUnreadUpdate,
    NotificationReceived,
    NotificationDeleted,
    AllNotificationsMarkedAsRead,
}

impl InboundEventType {
    pub const ALL: [Self; 15] = [
        Self::ReceiveMessage,
        Self::MessageReactionUpdate,
        Self::MessageReadUpdate,
        Self::MessageDeleted,
        Self::RoomUnreadCountUpdate,
        Self::TypingUpdate,
        Self::NewRoomCreated,
        Self::RoomsUnreadsUpdate,
        Self::UserOnline,
        Self::UserOffline,
        Self::UserStatusChange,
        Self::NotificationsUnreadUpdate,
        Self::NotificationReceived,
        Self::NotificationDeleted,
        Self::AllNotificationsMarkedAsRead,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReceiveMessage => "receive_message",
            Self::MessageReactionUpdate => "message_reaction_update",
            Self::MessageReadUpdate => "message_read_update",
            Self::MessageDeleted => "message_deleted",
            Self::RoomUnreadCountUpdate => "room_unread_count_update",
            Self::TypingUpdate => "typing_update",
            Self::NewRoomCreated => "new_room_created",
            Self::RoomsUnreadsUpdate => "rooms_unreads_update",
            Self::UserOnline => "user_online",
            Self::UserOffline => "user_offline",
            Self::UserStatusChange => "user_status_change",
            Self::NotificationsUnreadUpdate => "notifications_unread_update",
            Self::NotificationReceived => "notification_received",
            Self::NotificationDeleted => "notification_deleted",
            Self::AllNotificationsMarkedAsRead => "all_notifications_marked_as_read",
        }
    }

    /// Parse a wire name
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Check if this is a presence event
    #[must_use]
    pub const fn is_presence_event(self) -> bool {
        matches!(
            self,
            Self::UserOnline | Self::UserOffline | Self::UserStatusChange
        )
    }
}

impl fmt::Display for InboundEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events the client emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundEventType {
    // Rooms and messages
    JoinRoom,
    AddReaction,
    RemoveReaction,
    MarkMessageRead,
    DeleteMessage,
    TypingStart,
    TypingStop,

    // Presence
    CheckUserStatus,

    // Group administration
    GroupAddMembers,
    GroupAddAdmin,
    GroupRemoveMember,
    GroupBanMember,
    GroupRestoreMember,
    GroupLeave,

    // Notifications
    CreateNotification,
    DeleteNotification,
    DeleteManyNotifications,
}

impl OutboundEventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JoinRoom => "join_room",
            Self::AddReaction => "add_reaction",
            Self::RemoveReaction => "remove_reaction",
            Self::MarkMessageRead => "mark_message_read",
            Self::DeleteMessage => "delete_message",
            Self::TypingStart => "typing_start",
            Self::TypingStop => "typing_stop",
            Self::CheckUserStatus => "check_user_status",
            Self::GroupAddMembers => "group_add_members",
            Self::GroupAddAdmin => "group_add_admin",
            Self::GroupRemoveMember => "group_remove_member",
            Self::GroupBanMember => "group_ban_member",
            Self::GroupRestoreMember => "group_restore_member",
            Self::GroupLeave => "group_leave",
            Self::CreateNotification => "create_notification",
            Self::DeleteNotification => "delete_notification",
            Self::DeleteManyNotifications => "delete_many_notifications",
        }
    }
}

impl fmt::Display for OutboundEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
