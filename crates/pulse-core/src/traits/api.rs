//! HTTP collaborator consumed by the realtime layer
//!
//! The realtime layer owns no CRUD. It reads baselines and badge counts over HTTP and uses
//! the HTTP mutations as a fallback whenever the channel is not connected.

use async_trait::async_trait;

use crate::entities::{LikeState, MessageReactions, ReadReceiptSet};
use crate::error::DomainError;
use crate::value_objects::{MessageId, PostId, RoomId};

/// Result type for collaborator calls
pub type ApiResult<T> = Result<T, DomainError>;

#[async_trait]
pub trait RealtimeApi: Send + Sync {
    /// Replace the bearer token used for subsequent requests
    fn authorize(&self, token: Option<String>);

    // ========================================================================
    // Reads
    // ========================================================================

    /// Lightweight health endpoint, used to pre-warm the backend
    async fn health(&self) -> ApiResult<()>;

    async fn unread_notification_count(&self) -> ApiResult<u64>;

    async fn unread_room_count(&self) -> ApiResult<u64>;

    /// Baseline reaction list for a message
    async fn message_reactions(&self, message_id: &MessageId) -> ApiResult<MessageReactions>;

    /// Baseline read receipts for a message
    async fn message_reads(&self, message_id: &MessageId) -> ApiResult<ReadReceiptSet>;

    // ========================================================================
    // Mutations (fallback path)
    // ========================================================================

    async fn add_reaction(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
        content: &str,
    ) -> ApiResult<()>;

    async fn remove_reaction(&self, message_id: &MessageId, room_id: &RoomId) -> ApiResult<()>;

    async fn mark_message_read(&self, message_id: &MessageId, room_id: &RoomId) -> ApiResult<()>;

    async fn delete_message(&self, message_id: &MessageId, room_id: &RoomId) -> ApiResult<()>;

    /// Like or unlike a post; returns the server's resulting state
    async fn set_post_like(&self, post_id: &PostId, liked: bool) -> ApiResult<LikeState>;
}
