//! Like state per post

use pulse_core::{LikeState, PostId};

use crate::versioned::{Versioned, VersionedMap};

#[derive(Debug, Default)]
pub struct LikeStore {
    states: VersionedMap<PostId, LikeState>,
}

impl LikeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, post_id: &PostId) -> Option<LikeState> {
        self.states.get(post_id)
    }

    pub fn snapshot(&self, post_id: &PostId) -> Option<Versioned<LikeState>> {
        self.states.snapshot(post_id)
    }

    /// Seed from a feed page without overriding in-flight toggles
    pub fn seed(&self, state: LikeState) -> bool {
        self.states.set_if_absent(state.post_id.clone(), state)
    }

    pub fn set(&self, state: LikeState) -> u64 {
        self.states.set(state.post_id.clone(), state)
    }

    pub fn rollback(&self, post_id: &PostId, written: u64, previous: Option<LikeState>) -> bool {
        self.states.restore_if_current(post_id, written, previous)
    }

    pub fn clear(&self) {
        self.states.clear();
    }
}
