//! Pending-event buffer
//!
//! Every inbound message is appended here regardless of which room is on screen. When a
//! room view mounts it drains its room exactly once; anything never drained is dropped by
//! the periodic sweep once it is older than the TTL.

use dashmap::DashMap;
use pulse_core::{Message, RoomId, TempId};
use std::time::Duration;
use tokio::time::Instant;

/// A `receive_message` payload held for a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvent {
    pub room_id: RoomId,
    pub message: Message,
    pub temp_id: Option<TempId>,
    pub received_at: Instant,
}

impl PendingEvent {
    pub fn new(room_id: RoomId, message: Message, temp_id: Option<TempId>) -> Self {
        Self {
            room_id,
            message,
            temp_id,
            received_at: Instant::now(),
        }
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.received_at) >= ttl
    }
}

#[derive(Debug, Default)]
pub struct PendingBuffer {
    rooms: DashMap<RoomId, Vec<PendingEvent>>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: PendingEvent) {
        self.rooms
            .entry(event.room_id.clone())
            .or_default()
            .push(event);
    }

    /// Remove and return everything buffered for the room, in arrival order
    pub fn drain(&self, room_id: &RoomId) -> Vec<PendingEvent> {
        self.rooms
            .remove(room_id)
            .map(|(_, events)| events)
            .unwrap_or_default()
    }

    /// Drop events older than `ttl`; returns how many were dropped
    pub fn sweep(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut dropped = 0;

        self.rooms.retain(|_, events| {
            let before = events.len();
            events.retain(|e| !e.is_expired(now, ttl));
            dropped += before - events.len();
            !events.is_empty()
        });

        if dropped > 0 {
            tracing::debug!(dropped, "Expired pending events");
        }
        dropped
    }

    pub fn pending_for(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, |events| events.len())
    }

    pub fn total(&self) -> usize {
        self.rooms.iter().map(|events| events.len()).sum()
    }

    pub fn clear(&self) {
        self.rooms.clear();
    }
}
