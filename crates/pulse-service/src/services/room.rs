//! Room mounting
//!
//! Opening a room joins it on the channel, drains whatever the pending buffer collected
//! for it, and then streams the room's live events. A message handed out by the drain is
//! not streamed a second time. Dropping the view undoes the join and clears the room's
//! typing state.

use pulse_cache::PendingEvent;
use pulse_core::{MessageId, RoomId};
use pulse_realtime::{ChannelHandle, ConnectionState, InboundEvent};
use std::collections::HashSet;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::instrument;

use super::context::ServiceContext;
use super::deletion::DeletionService;
use super::error::{ServiceError, ServiceResult};
use super::typing::TypingService;

/// Room service
pub struct RoomService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoomService<'a> {
    /// Create a new RoomService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mount a room view
    #[instrument(skip(self), fields(room_id = %room_id))]
    pub async fn open(&self, room_id: &RoomId) -> ServiceResult<RoomView> {
        let channel = self.ctx.channel().ok_or(ServiceError::NotSignedIn)?;

        // Subscribe before draining so nothing falls between the two
        let events = channel.subscribe()?;
        channel.join_room(room_id.clone()).await?;
        let pending = self.ctx.cache().pending.drain(room_id);

        tracing::debug!(pending = pending.len(), "Room opened");
        Ok(RoomView {
            ctx: self.ctx.clone(),
            room_id: room_id.clone(),
            generation: channel.generation(),
            channel: Some(channel),
            events: Some(events),
            drained: DrainedIds::new(&pending),
            pending,
        })
    }
}

/// A mounted room
pub struct RoomView {
    ctx: ServiceContext,
    room_id: RoomId,
    generation: u64,
    channel: Option<ChannelHandle>,
    events: Option<broadcast::Receiver<InboundEvent>>,
    pending: Vec<PendingEvent>,
    drained: DrainedIds,
}

impl RoomView {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Messages that arrived before the view mounted; empty after the first call
    pub fn take_pending(&mut self) -> Vec<PendingEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Next live event for this room
    ///
    /// Follows the session's channel across replacements, including a manual retry after
    /// the manager gave up. Returns `None` once the session ends.
    pub async fn next_event(&mut self) -> Option<InboundEvent> {
        loop {
            let received = match self.events.as_mut() {
                Some(events) => events.recv().await,
                None => return None,
            };

            match received {
                Ok(event) if self.drained.is_replay(&event) => {}
                Ok(event) if self.concerns(&event) => {
                    self.observe(&event);
                    return Some(event);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(room_id = %self.room_id, skipped, "Room view lagged behind");
                }
                Err(RecvError::Closed) => {
                    if !self.follow_channel().await {
                        self.events = None;
                        return None;
                    }
                }
            }
        }
    }

    /// Events for this room, plus message-level updates that carry no room
    fn concerns(&self, event: &InboundEvent) -> bool {
        match event.room_id() {
            Some(room_id) => room_id == &self.room_id,
            None => matches!(
                event,
                InboundEvent::ReactionUpdate(_) | InboundEvent::ReadUpdate(_)
            ),
        }
    }

    fn observe(&self, event: &InboundEvent) {
        match event {
            // Delivered live; the buffered copy is no longer needed
            InboundEvent::ReceiveMessage(_) => {
                self.ctx.cache().pending.drain(&self.room_id);
            }
            InboundEvent::MessageDeleted(deleted) => {
                DeletionService::new(&self.ctx).confirm(&deleted.message_id);
            }
            _ => {}
        }
    }

    /// Re-attach to the session's next channel once the previous one closed
    ///
    /// Waits while the manager is offline; gives up when the session ends.
    async fn follow_channel(&mut self) -> bool {
        let mut states = self.ctx.manager().subscribe_state();
        loop {
            if let Some(channel) = self
                .ctx
                .channel()
                .filter(|channel| channel.generation() != self.generation)
            {
                return self.attach(channel).await;
            }
            if *states.borrow_and_update() == ConnectionState::Idle {
                return false;
            }
            tracing::debug!(room_id = %self.room_id, "Room view waiting for a channel");
            if states.changed().await.is_err() {
                return false;
            }
        }
    }

    async fn attach(&mut self, channel: ChannelHandle) -> bool {
        let Ok(events) = channel.subscribe() else {
            return false;
        };
        if let Err(e) = channel.join_room(self.room_id.clone()).await {
            tracing::debug!(room_id = %self.room_id, error = %e, "Re-join deferred");
        }

        tracing::debug!(
            room_id = %self.room_id,
            generation = channel.generation(),
            "Room view moved to new channel"
        );
        self.generation = channel.generation();
        self.channel = Some(channel);
        self.events = Some(events);
        self.drained = DrainedIds::default();
        true
    }
}

/// Ids of the messages drained at mount
///
/// A message routed between subscribing and draining reaches both the drain and the live
/// stream; the live copy is dropped.
#[derive(Debug, Default)]
struct DrainedIds(HashSet<MessageId>);

impl DrainedIds {
    fn new(pending: &[PendingEvent]) -> Self {
        Self(pending.iter().map(|event| event.message.id.clone()).collect())
    }

    fn is_replay(&mut self, event: &InboundEvent) -> bool {
        match event {
            InboundEvent::ReceiveMessage(payload) => self.0.remove(&payload.new_message.id),
            _ => false,
        }
    }
}

impl Drop for RoomView {
    fn drop(&mut self) {
        self.events = None;
        if let Some(channel) = self.channel.take() {
            channel.forget_room(&self.room_id);
        }
        TypingService::new(&self.ctx).leave_room(&self.room_id);
        tracing::debug!(room_id = %self.room_id, "Room closed");
    }
}

impl std::fmt::Debug for RoomView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomView")
            .field("room_id", &self.room_id)
            .field("generation", &self.generation)
            .field("pending", &self.pending.len())
            .finish()
    }
}
