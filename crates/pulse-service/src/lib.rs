//! # pulse-service
//!
//! Application layer of the realtime client: services over the connection manager and
//! caches, media uploads, and transcript rendering helpers.

pub mod render;
pub mod services;
pub mod upload;

pub use render::{cluster, ClusterPosition, ClusteredMessage};
pub use services::{
    Delivery, DeletionService, DeletionState, GroupService, LikeService, Mutation, Notice,
    NoticeBus, NoticeKind, NotificationService, PresenceService, ReactionService,
    ReadReceiptService, RoomService, RoomView, ServiceContext, ServiceError, ServiceResult,
    TypingService,
};
pub use upload::{UploadHandle, UploadManager};
