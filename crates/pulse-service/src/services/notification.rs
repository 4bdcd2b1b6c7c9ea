//! Notification service

use pulse_cache::UnreadSnapshot;
use pulse_core::{NotificationId, PostId, UserId};
use pulse_realtime::protocol::{CreateNotificationPayload, NotificationIdsPayload, NotificationRef};
use pulse_realtime::OutboundEvent;
use tracing::instrument;

use super::context::ServiceContext;
use super::dispatch::emit_only;
use super::error::{ServiceError, ServiceResult};

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Current badge counters
    pub fn unread(&self) -> UnreadSnapshot {
        self.ctx.cache().unread.snapshot()
    }

    /// Re-seed both badges from HTTP
    #[instrument(skip(self))]
    pub async fn refresh_unread(&self) -> ServiceResult<UnreadSnapshot> {
        let api = self.ctx.api();
        let (notifications, rooms) =
            futures::try_join!(api.unread_notification_count(), api.unread_room_count())?;

        let unread = &self.ctx.cache().unread;
        unread.set_notifications(notifications);
        unread.set_rooms(rooms);
        Ok(unread.snapshot())
    }

    /// Notify another user, e.g. of a like on their post
    #[instrument(skip(self, message), fields(recipient_id = %recipient_id, kind = %kind))]
    pub async fn create(
        &self,
        recipient_id: &UserId,
        kind: &str,
        post_id: Option<PostId>,
        message: Option<String>,
    ) -> ServiceResult<()> {
        if kind.trim().is_empty() {
            return Err(ServiceError::validation("Notification type is required"));
        }
        let me = self.ctx.current_user()?;
        if &me.id == recipient_id {
            tracing::debug!("Skipping self-notification");
            return Ok(());
        }

        emit_only(
            self.ctx,
            OutboundEvent::CreateNotification(CreateNotificationPayload {
                recipient_id: recipient_id.clone(),
                kind: kind.to_string(),
                post_id,
                message,
            }),
        )
        .await
    }

    #[instrument(skip(self), fields(notification_id = %notification_id))]
    pub async fn delete(&self, notification_id: &NotificationId) -> ServiceResult<()> {
        emit_only(
            self.ctx,
            OutboundEvent::DeleteNotification(NotificationRef {
                notification_id: notification_id.clone(),
            }),
        )
        .await
    }

    #[instrument(skip(self, notification_ids), fields(count = notification_ids.len()))]
    pub async fn delete_many(&self, notification_ids: Vec<NotificationId>) -> ServiceResult<()> {
        if notification_ids.is_empty() {
            return Ok(());
        }
        emit_only(
            self.ctx,
            OutboundEvent::DeleteManyNotifications(NotificationIdsPayload { notification_ids }),
        )
        .await
    }
}
