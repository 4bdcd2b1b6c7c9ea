//! Typed realtime events
//!
//! Inbound events are decoded into a closed sum type right at the channel boundary;
//! anything unknown or malformed never reaches the caches.

use pulse_core::{Notification, PresenceEntry, RoomId, RoomSummary, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::event_types::{InboundEventType, OutboundEventType};
use super::packet::Packet;
use super::payloads::{
    AddReactionPayload, CreateNotificationPayload, GroupMemberPayload, GroupMembersPayload,
    MessageRef, NotificationDeletedPayload, NotificationIdsPayload, NotificationRef,
    ReactionUpdatePayload, ReadUpdatePayload, ReceiveMessagePayload, RoomRef, RoomUnreadPayload,
    TypingUpdatePayload, UnreadCountPayload, UserRef,
};
use crate::error::ProtocolError;

/// Server-pushed event
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    ReceiveMessage(ReceiveMessagePayload),
    ReactionUpdate(ReactionUpdatePayload),
    ReadUpdate(ReadUpdatePayload),
    /// Server confirmation that a deferred deletion went through
    MessageDeleted(MessageRef),
    RoomUnreadCount(RoomUnreadPayload),
    TypingUpdate(TypingUpdatePayload),
    NewRoomCreated(RoomSummary),
    RoomsUnread(UnreadCountPayload),
    UserOnline(PresenceEntry),
    UserOffline(PresenceEntry),
    UserStatusChange(PresenceEntry),
    NotificationsUnread(UnreadCountPayload),
    NotificationReceived(Notification),
    NotificationDeleted(NotificationDeletedPayload),
    AllNotificationsRead,
}

impl InboundEvent {
    /// Decode an event packet's name and arguments
    pub fn decode(name: &str, data: Vec<Value>) -> Result<Self, ProtocolError> {
        let kind = InboundEventType::from_str(name)
            .ok_or_else(|| ProtocolError::UnknownEvent(name.to_string()))?;
        let payload = data.into_iter().next().unwrap_or(Value::Null);

        let event = match kind {
            InboundEventType::ReceiveMessage => Self::ReceiveMessage(parse(kind, payload)?),
            InboundEventType::MessageReactionUpdate => Self::ReactionUpdate(parse(kind, payload)?),
            InboundEventType::MessageReadUpdate => Self::ReadUpdate(parse(kind, payload)?),
            InboundEventType::MessageDeleted => Self::MessageDeleted(parse(kind, payload)?),
            InboundEventType::RoomUnreadCountUpdate => Self::RoomUnreadCount(parse(kind, payload)?),
            InboundEventType::TypingUpdate => Self::TypingUpdate(parse(kind, payload)?),
            InboundEventType::NewRoomCreated => Self::NewRoomCreated(parse(kind, payload)?),
            InboundEventType::RoomsUnreadsUpdate => Self::RoomsUnread(parse(kind, payload)?),
            InboundEventType::UserOnline => {
                let mut entry: PresenceEntry = parse(kind, payload)?;
                entry.is_online = true;
                Self::UserOnline(entry)
            }
            InboundEventType::UserOffline => {
                let mut entry: PresenceEntry = parse(kind, payload)?;
                entry.is_online = false;
                Self::UserOffline(entry)
            }
            InboundEventType::UserStatusChange => Self::UserStatusChange(parse(kind, payload)?),
            InboundEventType::NotificationsUnreadUpdate => {
                Self::NotificationsUnread(parse(kind, payload)?)
            }
            InboundEventType::NotificationReceived => {
                Self::NotificationReceived(parse(kind, payload)?)
            }
            InboundEventType::NotificationDeleted => {
                Self::NotificationDeleted(parse(kind, payload)?)
            }
            InboundEventType::AllNotificationsMarkedAsRead => Self::AllNotificationsRead,
        };

        Ok(event)
    }

    pub fn event_type(&self) -> InboundEventType {
        match self {
            Self::ReceiveMessage(_) => InboundEventType::ReceiveMessage,
            Self::ReactionUpdate(_) => InboundEventType::MessageReactionUpdate,
            Self::ReadUpdate(_) => InboundEventType::MessageReadUpdate,
            Self::MessageDeleted(_) => InboundEventType::MessageDeleted,
            Self::RoomUnreadCount(_) => InboundEventType::RoomUnreadCountUpdate,
            Self::TypingUpdate(_) => InboundEventType::TypingUpdate,
            Self::NewRoomCreated(_) => InboundEventType::NewRoomCreated,
            Self::RoomsUnread(_) => InboundEventType::RoomsUnreadsUpdate,
            Self::UserOnline(_) => InboundEventType::UserOnline,
            Self::UserOffline(_) => InboundEventType::UserOffline,
            Self::UserStatusChange(_) => InboundEventType::UserStatusChange,
            Self::NotificationsUnread(_) => InboundEventType::NotificationsUnreadUpdate,
            Self::NotificationReceived(_) => InboundEventType::NotificationReceived,
            Self::NotificationDeleted(_) => InboundEventType::NotificationDeleted,
            Self::AllNotificationsRead => InboundEventType::AllNotificationsMarkedAsRead,
        }
    }

    /// Room the event is scoped to, when it has one
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::ReceiveMessage(p) => Some(&p.room_id),
            Self::ReactionUpdate(p) => p.room_id.as_ref(),
            Self::ReadUpdate(p) => p.room_id.as_ref(),
            Self::MessageDeleted(p) => Some(&p.room_id),
            Self::RoomUnreadCount(p) => Some(&p.room_id),
            Self::TypingUpdate(p) => Some(&p.room_id),
            Self::NewRoomCreated(room) => Some(&room.id),
            _ => None,
        }
    }
}

fn parse<T: DeserializeOwned>(kind: InboundEventType, payload: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(payload).map_err(|source| ProtocolError::InvalidPayload {
        event: kind.as_str(),
        source,
    })
}

/// Client-emitted event
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    JoinRoom(RoomId),
    AddReaction(AddReactionPayload),
    RemoveReaction(MessageRef),
    MarkMessageRead(MessageRef),
    DeleteMessage(MessageRef),
    TypingStart(RoomRef),
    TypingStop(RoomRef),
    CheckUserStatus(UserRef),
    GroupAddMembers(GroupMembersPayload),
    GroupAddAdmin(GroupMemberPayload),
    GroupRemoveMember(GroupMemberPayload),
    GroupBanMember(GroupMemberPayload),
    GroupRestoreMember(GroupMemberPayload),
    GroupLeave(RoomRef),
    CreateNotification(CreateNotificationPayload),
    DeleteNotification(NotificationRef),
    DeleteManyNotifications(NotificationIdsPayload),
}

impl OutboundEvent {
    pub fn typing_start(room_id: RoomId) -> Self {
        Self::TypingStart(RoomRef { room_id })
    }

    pub fn typing_stop(room_id: RoomId) -> Self {
        Self::TypingStop(RoomRef { room_id })
    }

    pub fn check_user_status(user_id: UserId) -> Self {
        Self::CheckUserStatus(UserRef { user_id })
    }

    pub fn event_type(&self) -> OutboundEventType {
        match self {
            Self::JoinRoom(_) => OutboundEventType::JoinRoom,
            Self::AddReaction(_) => OutboundEventType::AddReaction,
            Self::RemoveReaction(_) => OutboundEventType::RemoveReaction,
            Self::MarkMessageRead(_) => OutboundEventType::MarkMessageRead,
            Self::DeleteMessage(_) => OutboundEventType::DeleteMessage,
            Self::TypingStart(_) => OutboundEventType::TypingStart,
            Self::TypingStop(_) => OutboundEventType::TypingStop,
            Self::CheckUserStatus(_) => OutboundEventType::CheckUserStatus,
            Self::GroupAddMembers(_) => OutboundEventType::GroupAddMembers,
            Self::GroupAddAdmin(_) => OutboundEventType::GroupAddAdmin,
            Self::GroupRemoveMember(_) => OutboundEventType::GroupRemoveMember,
            Self::GroupBanMember(_) => OutboundEventType::GroupBanMember,
            Self::GroupRestoreMember(_) => OutboundEventType::GroupRestoreMember,
            Self::GroupLeave(_) => OutboundEventType::GroupLeave,
            Self::CreateNotification(_) => OutboundEventType::CreateNotification,
            Self::DeleteNotification(_) => OutboundEventType::DeleteNotification,
            Self::DeleteManyNotifications(_) => OutboundEventType::DeleteManyNotifications,
        }
    }

    /// JSON argument sent after the event name
    pub fn payload(&self) -> Result<Value, ProtocolError> {
        match self {
            Self::JoinRoom(room_id) => to_value(room_id),
            Self::AddReaction(p) => to_value(p),
            Self::RemoveReaction(p)
            | Self::MarkMessageRead(p)
            | Self::DeleteMessage(p) => to_value(p),
            Self::TypingStart(p) | Self::TypingStop(p) | Self::GroupLeave(p) => to_value(p),
            Self::CheckUserStatus(p) => to_value(p),
            Self::GroupAddMembers(p) => to_value(p),
            Self::GroupAddAdmin(p)
            | Self::GroupRemoveMember(p)
            | Self::GroupBanMember(p)
            | Self::GroupRestoreMember(p) => to_value(p),
            Self::CreateNotification(p) => to_value(p),
            Self::DeleteNotification(p) => to_value(p),
            Self::DeleteManyNotifications(p) => to_value(p),
        }
    }

    pub fn to_packet(&self, ack: Option<u64>) -> Result<Packet, ProtocolError> {
        Ok(Packet::event(self.event_type().as_str(), self.payload()?, ack))
    }
}

fn to_value(payload: &impl Serialize) -> Result<Value, ProtocolError> {
    Ok(serde_json::to_value(payload)?)
}
