//! Wire protocol: packet codec, event names, payloads, and typed events

mod disconnect;
mod event_types;
mod events;
mod packet;
mod payloads;

pub use disconnect::DisconnectReason;
pub use event_types::{InboundEventType, OutboundEventType};
pub use events::{InboundEvent, OutboundEvent};
pub use packet::{Handshake, Packet};
pub use payloads::{
    AddReactionPayload, CreateNotificationPayload, GroupMemberPayload, GroupMembersPayload,
    MessageRef, NotificationDeletedPayload, NotificationIdsPayload, NotificationRef,
    ReactionUpdatePayload, ReadUpdatePayload, ReceiveMessagePayload, RoomRef, RoomUnreadPayload,
    TypingUpdatePayload, UnreadCountPayload, UserRef,
};
