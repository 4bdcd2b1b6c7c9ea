//! # pulse-core
//!
//! Domain layer for the realtime messaging and presence client: identifiers, entities,
//! domain errors, and the collaborator traits the infrastructure layer implements.
//! This crate performs no I/O.

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    DeliveryStatus, LikeState, Message, MessageKind, MessageReactions, Notification,
    PresenceEntry, Reaction, ReactionAggregate, ReactionUser, ReadReceipt, ReadReceiptSet,
    RoomSummary, TypingUser, UserSummary,
};
pub use error::{DomainError, UploadError};
pub use traits::{
    ApiResult, MediaUploader, ProgressFn, RealtimeApi, UploadRequest, UploadedMedia,
};
pub use value_objects::{
    MessageId, NotificationId, PostId, RoomId, TempAttachmentId, TempId, UserId,
};
