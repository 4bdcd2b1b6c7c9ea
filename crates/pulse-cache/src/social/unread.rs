//! Unread badge counters
//!
//! Seeded from HTTP on every transition into Connected, then kept current by push events.

use dashmap::DashMap;
use pulse_core::RoomId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the badge counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnreadSnapshot {
    pub notifications: u64,
    pub rooms: u64,
}

#[derive(Debug, Default)]
pub struct UnreadCounters {
    notifications: AtomicU64,
    rooms: AtomicU64,
    per_room: DashMap<RoomId, u64>,
}

impl UnreadCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UnreadSnapshot {
        UnreadSnapshot {
            notifications: self.notifications.load(Ordering::Acquire),
            rooms: self.rooms.load(Ordering::Acquire),
        }
    }

    pub fn set_notifications(&self, count: u64) {
        self.notifications.store(count, Ordering::Release);
    }

    pub fn increment_notifications(&self) {
        self.notifications.fetch_add(1, Ordering::AcqRel);
    }

    pub fn decrement_notifications(&self) {
        let _ = self
            .notifications
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1)));
    }

    pub fn set_rooms(&self, count: u64) {
        self.rooms.store(count, Ordering::Release);
    }

    pub fn set_room(&self, room_id: RoomId, count: u64) {
        if count == 0 {
            self.per_room.remove(&room_id);
        } else {
            self.per_room.insert(room_id, count);
        }
    }

    pub fn room(&self, room_id: &RoomId) -> u64 {
        self.per_room.get(room_id).map_or(0, |c| *c)
    }

    pub fn clear(&self) {
        self.notifications.store(0, Ordering::Release);
        self.rooms.store(0, Ordering::Release);
        self.per_room.clear();
    }
}
