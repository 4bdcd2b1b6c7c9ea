//! Presence and typing state

mod presence_cache;
mod typing;

pub use presence_cache::PresenceCache;
pub use typing::TypingSet;
