//! Read receipt sets per message

use dashmap::DashSet;
use pulse_core::{MessageId, ReadReceipt, ReadReceiptSet, UserId};

use crate::versioned::VersionedMap;

#[derive(Debug, Default)]
pub struct ReadReceiptStore {
    sets: VersionedMap<MessageId, ReadReceiptSet>,
    fetched: DashSet<MessageId>,
}

impl ReadReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, message_id: &MessageId) -> ReadReceiptSet {
        self.sets.get(message_id).unwrap_or_default()
    }

    pub fn has_read(&self, message_id: &MessageId, user_id: &UserId) -> bool {
        self.sets
            .get(message_id)
            .is_some_and(|set| set.contains(user_id))
    }

    /// Union `receipts` into the stored set; returns true if anything changed
    pub fn merge(&self, message_id: MessageId, receipts: &ReadReceiptSet) -> bool {
        self.sets
            .update(message_id, |current| {
                let mut next = current.cloned().unwrap_or_default();
                next.merge(receipts).then_some(next)
            })
            .is_some()
    }

    /// Record a local read
    ///
    /// Returns the written version together with the set it replaced, or `None` if the
    /// user had already read the message.
    pub fn record_local(
        &self,
        message_id: MessageId,
        receipt: ReadReceipt,
    ) -> Option<(u64, Option<ReadReceiptSet>)> {
        let mut previous = None;
        let written = self.sets.update(message_id, |current| {
            previous = current.cloned();
            let mut next = previous.clone().unwrap_or_default();
            next.insert(receipt).then_some(next)
        })?;
        Some((written, previous))
    }

    pub fn rollback(
        &self,
        message_id: &MessageId,
        written: u64,
        previous: Option<ReadReceiptSet>,
    ) -> bool {
        self.sets.restore_if_current(message_id, written, previous)
    }

    pub fn claim_fetch(&self, message_id: &MessageId) -> bool {
        self.fetched.insert(message_id.clone())
    }

    pub fn release_fetch(&self, message_id: &MessageId) {
        self.fetched.remove(message_id);
    }

    pub fn clear(&self) {
        self.sets.clear();
        self.fetched.clear();
    }
}
