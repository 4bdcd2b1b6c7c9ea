//! Typing indicator service
//!
//! The first keystroke in a room emits `typing_start`; further keystrokes only push the
//! idle deadline back. Once the deadline passes without input, `typing_stop` is emitted.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use pulse_core::{RoomId, TypingUser};
use pulse_realtime::OutboundEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::context::ServiceContext;
use super::dispatch::emit_only;

struct TypingTimer {
    id: u64,
    deadline: Arc<Mutex<Instant>>,
    cancel: CancellationToken,
}

/// Active typing timers, one per room
#[derive(Default)]
pub(crate) struct TypingRegistry {
    rooms: DashMap<RoomId, TypingTimer>,
    next_id: AtomicU64,
}

impl TypingRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push the deadline back, or register a new timer if none runs for the room
    fn touch(
        &self,
        room_id: RoomId,
        deadline: Instant,
    ) -> Option<(u64, Arc<Mutex<Instant>>, CancellationToken)> {
        match self.rooms.entry(room_id) {
            Entry::Occupied(timer) => {
                *timer.get().deadline.lock() = deadline;
                None
            }
            Entry::Vacant(slot) => {
                let timer = TypingTimer {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    deadline: Arc::new(Mutex::new(deadline)),
                    cancel: CancellationToken::new(),
                };
                let handle = (timer.id, timer.deadline.clone(), timer.cancel.clone());
                slot.insert(timer);
                Some(handle)
            }
        }
    }

    /// Remove the timer `id` if it is still the room's timer
    fn finish(&self, room_id: &RoomId, id: u64) -> bool {
        self.rooms.remove_if(room_id, |_, timer| timer.id == id).is_some()
    }

    /// Cancel and remove the room's timer; returns whether one was running
    fn stop(&self, room_id: &RoomId) -> bool {
        match self.rooms.remove(room_id) {
            Some((_, timer)) => {
                timer.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_active(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub(crate) fn clear(&self) {
        self.rooms.retain(|_, timer| {
            timer.cancel.cancel();
            false
        });
    }
}

/// Typing service
pub struct TypingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TypingService<'a> {
    /// Create a new TypingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a keystroke; returns true when this keystroke emitted `typing_start`
    pub async fn keystroke(&self, room_id: &RoomId) -> bool {
        let idle = self.ctx.timing().typing_idle();
        let registry = self.ctx.typing();

        let Some((id, deadline, cancel)) = registry.touch(room_id.clone(), Instant::now() + idle)
        else {
            return false;
        };

        if let Err(e) = emit_only(self.ctx, OutboundEvent::typing_start(room_id.clone())).await {
            tracing::debug!(room_id = %room_id, error = %e, "typing_start not sent");
            registry.finish(room_id, id);
            return false;
        }

        let ctx = self.ctx.clone();
        let room_id = room_id.clone();
        tokio::spawn(async move {
            loop {
                let until = *deadline.lock();
                tokio::select! {
                    () = cancel.cancelled() => return,
                    () = tokio::time::sleep_until(until) => {}
                }
                if *deadline.lock() <= Instant::now() {
                    break;
                }
            }

            if ctx.typing().finish(&room_id, id) {
                if let Err(e) = emit_only(&ctx, OutboundEvent::typing_stop(room_id.clone())).await {
                    tracing::debug!(room_id = %room_id, error = %e, "typing_stop not sent");
                }
            }
        });
        true
    }

    /// Stop typing now, e.g. when the message is sent
    pub async fn stop(&self, room_id: &RoomId) -> bool {
        if !self.ctx.typing().stop(room_id) {
            return false;
        }
        if let Err(e) = emit_only(self.ctx, OutboundEvent::typing_stop(room_id.clone())).await {
            tracing::debug!(room_id = %room_id, error = %e, "typing_stop not sent");
        }
        true
    }

    pub fn is_typing(&self, room_id: &RoomId) -> bool {
        self.ctx.typing().is_active(room_id)
    }

    /// Other users currently typing in a room
    pub fn typing_users(&self, room_id: &RoomId) -> Vec<TypingUser> {
        let me = self.ctx.session().ok();
        self.ctx
            .cache()
            .typing
            .typing_in(room_id, me.as_ref().map(|session| session.user_id()))
    }

    /// Leaving a room: forget who is typing there and end our own indicator
    ///
    /// Synchronous; a pending `typing_stop` is sent in the background when a runtime is
    /// available.
    pub fn leave_room(&self, room_id: &RoomId) {
        self.ctx.cache().typing.clear_room(room_id);
        if !self.ctx.typing().stop(room_id) {
            return;
        }

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let ctx = self.ctx.clone();
            let room_id = room_id.clone();
            runtime.spawn(async move {
                let _ = emit_only(&ctx, OutboundEvent::typing_stop(room_id)).await;
            });
        }
    }
}
