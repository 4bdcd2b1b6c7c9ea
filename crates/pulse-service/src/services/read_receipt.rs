//! Read receipt service
//!
//! Marks messages read optimistically and derives the sender-side delivery status.

use pulse_core::{DeliveryStatus, Message, MessageId, ReadReceipt, ReadReceiptSet};
use pulse_realtime::protocol::MessageRef;
use pulse_realtime::OutboundEvent;
use tracing::instrument;

use super::context::ServiceContext;
use super::dispatch::{emit_or_fallback, Mutation};
use super::error::ServiceResult;
use super::notice::{Notice, NoticeKind};

/// Read receipt service
pub struct ReadReceiptService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReadReceiptService<'a> {
    /// Create a new ReadReceiptService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn receipts(&self, message_id: &MessageId) -> ReadReceiptSet {
        self.ctx.cache().reads.get(message_id)
    }

    /// Fetch receipts once per message and merge them in
    #[instrument(skip(self), fields(message_id = %message_id))]
    pub async fn load_baseline(&self, message_id: &MessageId) -> ServiceResult<bool> {
        let store = &self.ctx.cache().reads;
        if !store.claim_fetch(message_id) {
            return Ok(false);
        }

        match self.ctx.api().message_reads(message_id).await {
            Ok(receipts) => Ok(store.merge(message_id.clone(), &receipts)),
            Err(e) => {
                store.release_fetch(message_id);
                Err(e.into())
            }
        }
    }

    /// Mark a message as read by the signed-in user
    ///
    /// Own messages, system messages and messages already read are skipped without a
    /// network call.
    #[instrument(skip(self, message), fields(message_id = %message.id, room_id = %message.room_id))]
    pub async fn mark_read(&self, message: &Message) -> ServiceResult<Mutation> {
        let me = self.ctx.current_user()?.id;
        if message.is_system() || message.is_from(&me) {
            return Ok(Mutation::Unchanged);
        }

        let _guard = self.ctx.read_locks().lock(&message.id).await;
        let store = &self.ctx.cache().reads;
        let Some((written, previous)) =
            store.record_local(message.id.clone(), ReadReceipt::now(me))
        else {
            return Ok(Mutation::Unchanged);
        };

        let event = OutboundEvent::MarkMessageRead(MessageRef::new(
            message.id.clone(),
            message.room_id.clone(),
        ));
        let api = self.ctx.api();
        let delivered = emit_or_fallback(self.ctx, event, || {
            api.mark_message_read(&message.id, &message.room_id)
        })
        .await;

        match delivered {
            Ok(delivery) => Ok(Mutation::Applied(delivery)),
            Err(e) => {
                let restored = store.rollback(&message.id, written, previous);
                tracing::warn!(error = %e, restored, "Mark read failed");
                self.ctx
                    .notices()
                    .publish(Notice::from_error(NoticeKind::ReadReceiptFailed, &e));
                Err(e)
            }
        }
    }

    /// Mark every unread message from others in a batch, stopping at the first failure
    pub async fn mark_all_read(&self, messages: &[Message]) -> ServiceResult<usize> {
        let mut marked = 0;
        for message in messages {
            if self.mark_read(message).await?.is_applied() {
                marked += 1;
            }
        }
        Ok(marked)
    }

    /// Status shown under a message the signed-in user sent
    ///
    /// `confirmed` is whether the server has echoed the message back.
    pub fn status(&self, message: &Message, confirmed: bool) -> DeliveryStatus {
        let sender = message.sender_id().cloned().unwrap_or_default();
        DeliveryStatus::resolve(confirmed, &self.receipts(&message.id), &sender)
    }
}
