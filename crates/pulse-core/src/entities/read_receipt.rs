//! Read receipts - monotonic per-message reader sets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// One user's read of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    #[serde(alias = "user")]
    pub user_id: UserId,
    #[serde(default = "Utc::now")]
    pub read_at: DateTime<Utc>,
}

impl ReadReceipt {
    pub fn now(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            read_at: Utc::now(),
        }
    }
}

/// Readers of one message
///
/// Grows only: a receipt is never removed and its timestamp never moves forward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadReceiptSet(Vec<ReadReceipt>);

impl ReadReceiptSet {
    pub fn new(receipts: impl IntoIterator<Item = ReadReceipt>) -> Self {
        let mut set = Self::default();
        for receipt in receipts {
            set.insert(receipt);
        }
        set
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.0.iter().any(|r| &r.user_id == user_id)
    }

    /// Returns true if the set changed
    pub fn insert(&mut self, receipt: ReadReceipt) -> bool {
        match self.0.iter_mut().find(|r| r.user_id == receipt.user_id) {
            Some(existing) if receipt.read_at < existing.read_at => {
                existing.read_at = receipt.read_at;
                true
            }
            Some(_) => false,
            None => {
                self.0.push(receipt);
                true
            }
        }
    }

    /// Union with another set; returns true if anything changed
    pub fn merge(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for receipt in &other.0 {
            changed |= self.insert(receipt.clone());
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReadReceipt> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of readers other than `user_id`
    pub fn readers_other_than(&self, user_id: &UserId) -> usize {
        self.0.iter().filter(|r| &r.user_id != user_id).count()
    }
}

/// Delivery indicator shown on the sender's own messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Optimistic, not yet echoed by the server
    Sending,
    Delivered,
    Read,
}

impl DeliveryStatus {
    /// Status for a message the given sender authored
    pub fn resolve(confirmed: bool, receipts: &ReadReceiptSet, sender: &UserId) -> Self {
        if !confirmed {
            Self::Sending
        } else if receipts.readers_other_than(sender) > 0 {
            Self::Read
        } else {
            Self::Delivered
        }
    }
}
