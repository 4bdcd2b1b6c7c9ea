//! Reaction service
//!
//! Optimistic add/remove of a user's emoji reaction on a message. The local list changes
//! immediately; if neither the channel nor the HTTP fallback delivers the change, the
//! list is restored unless a newer write has replaced it in the meantime.

use pulse_core::{DomainError, MessageId, MessageReactions, ReactionAggregate, RoomId};
use pulse_realtime::protocol::{AddReactionPayload, MessageRef};
use pulse_realtime::OutboundEvent;
use tracing::instrument;

use super::context::ServiceContext;
use super::dispatch::{emit_or_fallback, Mutation};
use super::error::ServiceResult;
use super::notice::{Notice, NoticeKind};

#[derive(Debug, Clone, Copy)]
enum ReactionOp<'c> {
    Add(&'c str),
    Remove,
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn reactions(&self, message_id: &MessageId) -> MessageReactions {
        self.ctx.cache().reactions.get(message_id)
    }

    /// Display groups for a message, flagged for the signed-in user
    pub fn aggregate(&self, message_id: &MessageId) -> Vec<ReactionAggregate> {
        let me = self.ctx.session().ok();
        self.reactions(message_id)
            .aggregate(me.as_ref().map(|session| session.user_id()))
    }

    /// Fetch the reaction list once per message
    ///
    /// Returns false when a baseline was already fetched or a push event got there first.
    #[instrument(skip(self), fields(message_id = %message_id))]
    pub async fn load_baseline(&self, message_id: &MessageId) -> ServiceResult<bool> {
        let store = &self.ctx.cache().reactions;
        if !store.claim_fetch(message_id) {
            return Ok(false);
        }

        match self.ctx.api().message_reactions(message_id).await {
            Ok(reactions) => Ok(store.apply_baseline(message_id.clone(), reactions)),
            Err(e) => {
                store.release_fetch(message_id);
                Err(e.into())
            }
        }
    }

    /// React with `content`, replacing any other reaction by the same user
    ///
    /// Reacting twice with the same emoji is a no-op and sends nothing.
    #[instrument(skip(self), fields(message_id = %message_id, room_id = %room_id))]
    pub async fn add(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
        content: &str,
    ) -> ServiceResult<Mutation> {
        if content.trim().is_empty() {
            return Err(DomainError::EmptyReaction.into());
        }
        self.apply(message_id, room_id, ReactionOp::Add(content)).await
    }

    #[instrument(skip(self), fields(message_id = %message_id, room_id = %room_id))]
    pub async fn remove(&self, message_id: &MessageId, room_id: &RoomId) -> ServiceResult<Mutation> {
        self.apply(message_id, room_id, ReactionOp::Remove).await
    }

    /// Tapping an emoji: removes it if it is the user's current reaction, adds it otherwise
    pub async fn toggle(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
        content: &str,
    ) -> ServiceResult<Mutation> {
        let user = self.ctx.current_user()?;
        let already = self
            .reactions(message_id)
            .reaction_of(&user.id)
            .is_some_and(|r| r.is_emoji(content));

        if already {
            self.remove(message_id, room_id).await
        } else {
            self.add(message_id, room_id, content).await
        }
    }

    async fn apply(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
        op: ReactionOp<'_>,
    ) -> ServiceResult<Mutation> {
        let user = self.ctx.current_user()?;
        let _guard = self.ctx.reaction_locks().lock(message_id).await;
        let store = &self.ctx.cache().reactions;

        let previous = store.snapshot(message_id).map(|v| v.value);
        let current = previous.clone().unwrap_or_default();
        let next = match op {
            ReactionOp::Add(content) => current.with_reaction(&user, content),
            ReactionOp::Remove => current.without_reaction(&user.id),
        };
        let Some(next) = next else {
            tracing::debug!("Reaction already in requested state");
            return Ok(Mutation::Unchanged);
        };

        let written = store.apply_local(message_id.clone(), next);
        let api = self.ctx.api();
        let delivered = match op {
            ReactionOp::Add(content) => {
                let event = OutboundEvent::AddReaction(AddReactionPayload {
                    message_id: message_id.clone(),
                    room_id: room_id.clone(),
                    content: content.to_string(),
                });
                emit_or_fallback(self.ctx, event, || {
                    api.add_reaction(message_id, room_id, content)
                })
                .await
            }
            ReactionOp::Remove => {
                let event =
                    OutboundEvent::RemoveReaction(MessageRef::new(message_id.clone(), room_id.clone()));
                emit_or_fallback(self.ctx, event, || api.remove_reaction(message_id, room_id)).await
            }
        };

        match delivered {
            Ok(delivery) => Ok(Mutation::Applied(delivery)),
            Err(e) => {
                let restored = store.rollback(message_id, written, previous);
                tracing::warn!(error = %e, restored, "Reaction change failed");
                self.ctx
                    .notices()
                    .publish(Notice::from_error(NoticeKind::ReactionFailed, &e));
                Err(e)
            }
        }
    }
}
