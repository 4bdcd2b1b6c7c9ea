//! Reaction lists per message

use dashmap::DashSet;
use pulse_core::{MessageId, MessageReactions};

use crate::versioned::{Versioned, VersionedMap};

#[derive(Debug, Default)]
pub struct ReactionStore {
    lists: VersionedMap<MessageId, MessageReactions>,
    fetched: DashSet<MessageId>,
}

impl ReactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, message_id: &MessageId) -> MessageReactions {
        self.lists.get(message_id).unwrap_or_default()
    }

    pub fn snapshot(&self, message_id: &MessageId) -> Option<Versioned<MessageReactions>> {
        self.lists.snapshot(message_id)
    }

    /// Authoritative list from a push event
    pub fn apply_server(&self, message_id: MessageId, reactions: MessageReactions) -> u64 {
        self.lists.set(message_id, reactions)
    }

    /// Optimistic local write; returns the version to roll back against
    pub fn apply_local(&self, message_id: MessageId, reactions: MessageReactions) -> u64 {
        self.lists.set(message_id, reactions)
    }

    /// HTTP baseline; never overwrites a value written since
    pub fn apply_baseline(&self, message_id: MessageId, reactions: MessageReactions) -> bool {
        self.lists.set_if_absent(message_id, reactions)
    }

    pub fn rollback(
        &self,
        message_id: &MessageId,
        written: u64,
        previous: Option<MessageReactions>,
    ) -> bool {
        self.lists.restore_if_current(message_id, written, previous)
    }

    /// Claim the one baseline fetch for a message; false if already claimed
    pub fn claim_fetch(&self, message_id: &MessageId) -> bool {
        self.fetched.insert(message_id.clone())
    }

    /// Release a claim after a failed fetch so a later view can retry
    pub fn release_fetch(&self, message_id: &MessageId) {
        self.fetched.remove(message_id);
    }

    pub fn clear(&self) {
        self.lists.clear();
        self.fetched.clear();
    }
}
