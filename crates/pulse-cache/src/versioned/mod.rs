//! Versioned storage primitives for optimistic updates

mod keyed_locks;
mod versioned_map;

pub use keyed_locks::KeyedLocks;
pub use versioned_map::{Versioned, VersionedMap};
