//! Session-scoped bundle of every realtime store

use parking_lot::Mutex;
use pulse_core::UserId;

use crate::message_state::{ReactionStore, ReadReceiptStore};
use crate::pending::PendingBuffer;
use crate::presence::{PresenceCache, TypingSet};
use crate::social::{LikeStore, UnreadCounters};

/// All client-side realtime state for the signed-in user
///
/// Keys are stable across reconnects, so nothing here is invalidated when the channel
/// drops. Everything is cleared when the session ends or a different user signs in.
#[derive(Debug, Default)]
pub struct RealtimeCache {
    owner: Mutex<Option<UserId>>,
    pub presence: PresenceCache,
    pub typing: TypingSet,
    pub pending: PendingBuffer,
    pub reactions: ReactionStore,
    pub reads: ReadReceiptStore,
    pub likes: LikeStore,
    pub unread: UnreadCounters,
}

impl RealtimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate the cache with a user, clearing it if it belonged to someone else
    ///
    /// Returns true when the cache was cleared.
    pub fn bind_user(&self, user_id: &UserId) -> bool {
        let mut owner = self.owner.lock();
        match owner.as_ref() {
            Some(current) if current == user_id => false,
            Some(previous) => {
                tracing::info!(previous = %previous, next = %user_id, "Session user changed, clearing realtime cache");
                self.clear_stores();
                *owner = Some(user_id.clone());
                true
            }
            None => {
                *owner = Some(user_id.clone());
                false
            }
        }
    }

    pub fn owner(&self) -> Option<UserId> {
        self.owner.lock().clone()
    }

    /// Clear every store and forget the owner
    pub fn clear(&self) {
        let mut owner = self.owner.lock();
        self.clear_stores();
        *owner = None;
    }

    fn clear_stores(&self) {
        self.presence.clear();
        self.typing.clear();
        self.pending.clear();
        self.reactions.clear();
        self.reads.clear();
        self.likes.clear();
        self.unread.clear();
    }
}
