//! Per-peer online status
//!
//! Entries are written only by inbound presence events and never expire during a session.
//! The server sends no sequence numbers, so the last event to arrive wins even when an
//! older `lastSeen` arrives after a newer one.

use dashmap::DashMap;
use pulse_core::{PresenceEntry, UserId};

#[derive(Debug, Default)]
pub struct PresenceCache {
    entries: DashMap<UserId, PresenceEntry>,
}

impl PresenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the entry for `entry.user_id`
    pub fn apply(&self, entry: PresenceEntry) {
        tracing::trace!(
            user_id = %entry.user_id,
            is_online = entry.is_online,
            "Presence updated"
        );
        self.entries.insert(entry.user_id.clone(), entry);
    }

    /// Current knowledge about a peer; `None` means never reported
    pub fn query(&self, user_id: &UserId) -> Option<PresenceEntry> {
        self.entries.get(user_id).map(|e| e.clone())
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.entries.get(user_id).is_some_and(|e| e.is_online)
    }

    pub fn online_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_online).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
