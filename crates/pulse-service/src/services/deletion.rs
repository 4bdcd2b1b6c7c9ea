//! Deletion with undo
//!
//! ```text
//! Normal --request--> Pending (countdown) --cancel--> Normal
//!                        |
//!                     deadline
//!                        v
//!                     Deleted (delete_message sent) --message_deleted--> removed
//!                                                   \--confirm window--> removed
//! ```
//!
//! Exactly one intent exists per message, and the transition out of `Pending` happens
//! under the registry's entry lock, so a cancel racing the deadline either wins fully
//! (nothing sent) or loses fully (one `delete_message`).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pulse_core::{MessageId, RoomId};
use pulse_realtime::protocol::MessageRef;
use pulse_realtime::OutboundEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::context::ServiceContext;
use super::dispatch::emit_or_fallback;
use super::notice::{Notice, NoticeKind};

/// What the view shows for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionState {
    Normal,
    /// Countdown running; undo still possible
    Pending { remaining: Duration },
    /// Deletion sent, waiting for the server's confirmation
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Counting,
    Sent,
}

struct DeletionIntent {
    id: u64,
    room_id: RoomId,
    deadline: Instant,
    phase: Phase,
    cancel: CancellationToken,
}

#[derive(Default)]
pub(crate) struct DeletionRegistry {
    intents: DashMap<MessageId, DeletionIntent>,
    next_id: AtomicU64,
}

impl DeletionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn begin(
        &self,
        message_id: MessageId,
        room_id: RoomId,
        deadline: Instant,
    ) -> Option<(u64, CancellationToken)> {
        match self.intents.entry(message_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let cancel = CancellationToken::new();
                slot.insert(DeletionIntent {
                    id,
                    room_id,
                    deadline,
                    phase: Phase::Counting,
                    cancel: cancel.clone(),
                });
                Some((id, cancel))
            }
        }
    }

    fn cancel(&self, message_id: &MessageId) -> bool {
        match self
            .intents
            .remove_if(message_id, |_, intent| intent.phase == Phase::Counting)
        {
            Some((_, intent)) => {
                intent.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Move intent `id` from counting to sent; returns its room if this call did it
    fn fire(&self, message_id: &MessageId, id: u64) -> Option<RoomId> {
        let mut intent = self.intents.get_mut(message_id)?;
        if intent.id != id || intent.phase != Phase::Counting {
            return None;
        }
        intent.phase = Phase::Sent;
        Some(intent.room_id.clone())
    }

    fn revert(&self, message_id: &MessageId, id: u64) {
        self.intents.remove_if(message_id, |_, intent| intent.id == id);
    }

    /// Forget sent intent `id` that the server never confirmed
    fn expire(&self, message_id: &MessageId, id: u64) -> bool {
        self.intents
            .remove_if(message_id, |_, intent| {
                intent.id == id && intent.phase == Phase::Sent
            })
            .is_some()
    }

    pub(crate) fn confirm(&self, message_id: &MessageId) -> bool {
        self.intents.remove(message_id).is_some()
    }

    fn state(&self, message_id: &MessageId) -> DeletionState {
        match self.intents.get(message_id) {
            None => DeletionState::Normal,
            Some(intent) => match intent.phase {
                Phase::Counting => DeletionState::Pending {
                    remaining: intent.deadline.saturating_duration_since(Instant::now()),
                },
                Phase::Sent => DeletionState::Deleted,
            },
        }
    }

    /// Cancel every running countdown; returns how many were cancelled
    pub(crate) fn shutdown(&self) -> usize {
        let mut cancelled = 0;
        self.intents.retain(|_, intent| {
            if intent.phase == Phase::Counting {
                intent.cancel.cancel();
                cancelled += 1;
                false
            } else {
                true
            }
        });
        cancelled
    }
}

/// Deletion service
pub struct DeletionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DeletionService<'a> {
    /// Create a new DeletionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start the undo countdown for a message
    ///
    /// Returns false, doing nothing, if a deletion is already pending or sent.
    #[instrument(skip(self), fields(message_id = %message_id, room_id = %room_id))]
    pub fn request(&self, message_id: &MessageId, room_id: &RoomId) -> bool {
        let countdown = self.ctx.timing().deletion_countdown();
        let Some((id, cancel)) = self.ctx.deletions().begin(
            message_id.clone(),
            room_id.clone(),
            Instant::now() + countdown,
        ) else {
            return false;
        };

        let ctx = self.ctx.clone();
        let message_id = message_id.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(countdown) => {}
            }
            DeletionService::new(&ctx).send(&message_id, id).await;
        });

        tracing::debug!(countdown_ms = countdown.as_millis() as u64, "Deletion pending");
        true
    }

    /// Undo a pending deletion; false once the countdown has elapsed
    pub fn cancel(&self, message_id: &MessageId) -> bool {
        let cancelled = self.ctx.deletions().cancel(message_id);
        if cancelled {
            tracing::debug!(message_id = %message_id, "Deletion cancelled");
        }
        cancelled
    }

    pub fn state(&self, message_id: &MessageId) -> DeletionState {
        self.ctx.deletions().state(message_id)
    }

    /// Time left on the countdown, for the circular indicator
    pub fn remaining(&self, message_id: &MessageId) -> Option<Duration> {
        match self.state(message_id) {
            DeletionState::Pending { remaining } => Some(remaining),
            _ => None,
        }
    }

    /// Server confirmed the deletion; drop the placeholder
    pub fn confirm(&self, message_id: &MessageId) -> bool {
        self.ctx.deletions().confirm(message_id)
    }

    /// Cancel every running countdown, e.g. when the view unmounts
    pub fn shutdown(&self) -> usize {
        self.ctx.deletions().shutdown()
    }

    fn expire_unconfirmed(&self, message_id: &MessageId, id: u64) {
        let window = self.ctx.timing().deletion_confirm_window();
        let registry = self.ctx.deletions().clone();
        let message_id = message_id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if registry.expire(&message_id, id) {
                tracing::debug!(message_id = %message_id, "Deletion never confirmed, forgetting it");
            }
        });
    }

    async fn send(&self, message_id: &MessageId, id: u64) {
        let registry = self.ctx.deletions();
        let Some(room_id) = registry.fire(message_id, id) else {
            return;
        };

        let event = OutboundEvent::DeleteMessage(MessageRef::new(message_id.clone(), room_id.clone()));
        let api = self.ctx.api();
        let delivered = emit_or_fallback(self.ctx, event, || {
            api.delete_message(message_id, &room_id)
        })
        .await;

        match delivered {
            Ok(delivery) => {
                tracing::info!(
                    message_id = %message_id,
                    room_id = %room_id,
                    delivery = ?delivery,
                    "Message deletion sent"
                );
                self.expire_unconfirmed(message_id, id);
            }
            Err(e) => {
                registry.revert(message_id, id);
                tracing::warn!(message_id = %message_id, error = %e, "Message deletion failed");
                self.ctx
                    .notices()
                    .publish(Notice::from_error(NoticeKind::DeletionFailed, &e));
            }
        }
    }
}
