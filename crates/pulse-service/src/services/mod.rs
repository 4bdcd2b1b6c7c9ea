//! Client-side services
//!
//! Each service borrows the shared [`ServiceContext`] and covers one feature: optimistic
//! mutations (reactions, read receipts, likes), typing, deletion with undo, presence,
//! room mounting, and the fire-and-forget group and notification emitters.

pub mod context;
pub mod deletion;
pub mod dispatch;
pub mod error;
pub mod group;
pub mod like;
pub mod notice;
pub mod notification;
pub mod presence;
pub mod reaction;
pub mod read_receipt;
pub mod room;
pub mod typing;

// Re-export all services for convenience
pub use context::ServiceContext;
pub use deletion::{DeletionService, DeletionState};
pub use dispatch::{Delivery, Mutation};
pub use error::{ServiceError, ServiceResult};
pub use group::GroupService;
pub use like::LikeService;
pub use notice::{Notice, NoticeBus, NoticeKind};
pub use notification::NotificationService;
pub use presence::PresenceService;
pub use reaction::ReactionService;
pub use read_receipt::ReadReceiptService;
pub use room::{RoomService, RoomView};
pub use typing::TypingService;
