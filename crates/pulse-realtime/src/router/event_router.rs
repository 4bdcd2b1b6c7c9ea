//! Applies decoded inbound events to the session caches
//!
//! Runs on the channel's reader task before events are re-published to subscribers, so
//! every consumer observes caches that already reflect the event it receives.

use pulse_cache::{PendingEvent, RealtimeCache};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::protocol::InboundEvent;

#[derive(Debug, Clone)]
pub struct EventRouter {
    cache: Arc<RealtimeCache>,
    applied: Arc<AtomicU64>,
}

impl EventRouter {
    pub fn new(cache: Arc<RealtimeCache>) -> Self {
        Self {
            cache,
            applied: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of events routed since creation
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    pub fn apply(&self, event: &InboundEvent) {
        self.applied.fetch_add(1, Ordering::Relaxed);
        let cache = &self.cache;

        match event {
            InboundEvent::ReceiveMessage(payload) => {
                cache.pending.push(PendingEvent::new(
                    payload.room_id.clone(),
                    payload.message(),
                    payload.temp_id.clone(),
                ));
            }
            InboundEvent::ReactionUpdate(payload) => {
                cache
                    .reactions
                    .apply_server(payload.message_id.clone(), payload.reactions.clone());
            }
            InboundEvent::ReadUpdate(payload) => {
                cache.reads.merge(payload.message_id.clone(), &payload.reads);
            }
            InboundEvent::RoomUnreadCount(payload) => {
                cache
                    .unread
                    .set_room(payload.room_id.clone(), payload.unread_count);
            }
            InboundEvent::TypingUpdate(payload) => {
                cache
                    .typing
                    .replace(payload.room_id.clone(), payload.typing_users.clone());
            }
            InboundEvent::UserOnline(entry)
            | InboundEvent::UserOffline(entry)
            | InboundEvent::UserStatusChange(entry) => {
                cache.presence.apply(entry.clone());
            }
            InboundEvent::RoomsUnread(payload) => cache.unread.set_rooms(payload.unread_count),
            InboundEvent::NotificationsUnread(payload) => {
                cache.unread.set_notifications(payload.unread_count);
            }
            InboundEvent::NotificationReceived(notification) => {
                if notification.is_unread() {
                    cache.unread.increment_notifications();
                }
            }
            InboundEvent::AllNotificationsRead => cache.unread.set_notifications(0),
            // Consumed by subscribers only
            InboundEvent::MessageDeleted(_)
            | InboundEvent::NewRoomCreated(_)
            | InboundEvent::NotificationDeleted(_) => {}
        }

        tracing::trace!(event = %event.event_type(), "Inbound event applied");
    }
}
