//! # pulse-cache
//!
//! In-memory, session-scoped state for the realtime layer.
//!
//! ## Features
//!
//! - **Presence**: last-arrival-wins peer status and per-room typing lists
//! - **Pending events**: messages buffered until their room view drains them
//! - **Message state**: reaction lists and read receipts with versioned optimistic writes
//! - **Social**: post likes and unread badge counters
//!
//! Nothing here is persisted; the server is the source of truth after every reconnect.

pub mod message_state;
pub mod pending;
pub mod presence;
pub mod social;
pub mod store;
pub mod versioned;

pub use message_state::{ReactionStore, ReadReceiptStore};
pub use pending::{PendingBuffer, PendingEvent};
pub use presence::{PresenceCache, TypingSet};
pub use social::{LikeStore, UnreadCounters, UnreadSnapshot};
pub use store::RealtimeCache;
pub use versioned::{KeyedLocks, Versioned, VersionedMap};
