//! Concurrent map whose writes are stamped with a monotonically increasing version.
//!
//! An optimistic mutation remembers the version it wrote. Rolling back is only allowed
//! while that version is still current, so a rollback never clobbers a newer push event
//! or a later local mutation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// A value together with the version that wrote it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<V> {
    pub version: u64,
    pub value: V,
}

pub struct VersionedMap<K, V> {
    entries: DashMap<K, Versioned<V>>,
    clock: AtomicU64,
}

impl<K, V> VersionedMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn snapshot(&self, key: &K) -> Option<Versioned<V>> {
        self.entries.get(key).map(|e| e.clone())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Unconditional write; returns the new version
    pub fn set(&self, key: K, value: V) -> u64 {
        let version = self.tick();
        self.entries.insert(key, Versioned { version, value });
        version
    }

    /// Write only if nothing is stored yet
    pub fn set_if_absent(&self, key: K, value: V) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let version = self.tick();
                slot.insert(Versioned { version, value });
                true
            }
        }
    }

    /// Atomic read-modify-write
    ///
    /// `f` sees the current value and returns the replacement, or `None` to leave the
    /// entry untouched. Returns the new version when a write happened.
    pub fn update<F>(&self, key: K, f: F) -> Option<u64>
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => {
                let next = f(Some(&slot.get().value))?;
                let version = self.tick();
                slot.insert(Versioned {
                    version,
                    value: next,
                });
                Some(version)
            }
            Entry::Vacant(slot) => {
                let next = f(None)?;
                let version = self.tick();
                slot.insert(Versioned {
                    version,
                    value: next,
                });
                Some(version)
            }
        }
    }

    /// Put `previous` back if the entry still holds the write stamped `written`
    ///
    /// `previous == None` removes the entry. Returns false when a newer write won.
    pub fn restore_if_current(&self, key: &K, written: u64, previous: Option<V>) -> bool {
        let Some(mut current) = self.entries.get_mut(key) else {
            return false;
        };
        if current.version != written {
            return false;
        }

        match previous {
            Some(value) => {
                let version = self.tick();
                *current = Versioned { version, value };
            }
            None => {
                drop(current);
                self.entries.remove_if(key, |_, v| v.version == written);
            }
        }
        true
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, v)| v.value)
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

impl<K, V> Default for VersionedMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for VersionedMap<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedMap")
            .field("len", &self.entries.len())
            .field("clock", &self.clock.load(Ordering::Relaxed))
            .finish()
    }
}
