//! Value objects - identifiers shared by every layer

mod ids;

pub use ids::{MessageId, NotificationId, PostId, RoomId, TempAttachmentId, TempId, UserId};
