//! Per-message state reconciled between optimistic writes and push events

mod reactions;
mod read_receipts;

pub use reactions::ReactionStore;
pub use read_receipts::ReadReceiptStore;
