//! Domain entities - the objects the realtime layer keeps in sync

mod like;
mod message;
mod notification;
mod presence;
mod reaction;
mod read_receipt;
mod room;
mod user;

pub use like::LikeState;
pub use message::{Message, MessageKind};
pub use notification::Notification;
pub use presence::{PresenceEntry, TypingUser};
pub use reaction::{MessageReactions, Reaction, ReactionAggregate, ReactionUser};
pub use read_receipt::{DeliveryStatus, ReadReceipt, ReadReceiptSet};
pub use room::RoomSummary;
pub use user::UserSummary;
