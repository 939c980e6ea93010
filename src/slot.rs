//! Insertion-ordered key storage with per-key storage strategies.
//!
//! Every key is backed by a [`Slot`]: either a plain stored value, or an
//! intercepted slot that delegates reads and writes to a [`WatchEntry`]. The
//! containers consult the strategy on each mutation: intercepted keys are
//! written through the watch entry and never produce general change records.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::Key;
use crate::Value;
use crate::WatchEntry;

pub(crate) enum Slot<K, V> {
    Plain(V),
    Intercepted(Arc<WatchEntry<K, V>>),
}

impl<K: Key, V: Value> Slot<K, V> {
    pub(crate) fn value(&self) -> Option<V> {
        match self {
            Slot::Plain(value) => Some(value.clone()),
            Slot::Intercepted(entry) => entry.value(),
        }
    }
}

struct SlotEntry<K, V> {
    slot: Slot<K, V>,
    /// Locked keys can be written but not removed or re-intercepted
    locked: bool,
}

/// Outcome of [`SlotMap::write`]
pub(crate) enum Write<K, V> {
    /// The key was absent and now holds a plain value
    Inserted,
    /// The plain value changed; carries the previous value
    Replaced(V),
    /// The plain value was equal to the new one
    Unchanged,
    /// The key is intercepted; the caller must write through the entry
    Intercepted(Arc<WatchEntry<K, V>>),
}

pub(crate) struct SlotMap<K, V> {
    entries: IndexMap<K, SlotEntry<K, V>>,
}

impl<K: Key, V: Value> SlotMap<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub(crate) fn contains(
        &self,
        name: &K,
    ) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn get(
        &self,
        name: &K,
    ) -> Option<V> {
        self.entries.get(name).and_then(|entry| entry.slot.value())
    }

    pub(crate) fn is_intercepted(
        &self,
        name: &K,
    ) -> bool {
        matches!(
            self.entries.get(name),
            Some(SlotEntry {
                slot: Slot::Intercepted(_),
                ..
            })
        )
    }

    /// The watch entry backing `name`, if the key is intercepted
    pub(crate) fn intercepted_entry(
        &self,
        name: &K,
    ) -> Option<Arc<WatchEntry<K, V>>> {
        match self.entries.get(name) {
            Some(SlotEntry {
                slot: Slot::Intercepted(entry),
                ..
            }) => Some(Arc::clone(entry)),
            _ => None,
        }
    }

    pub(crate) fn is_locked(
        &self,
        name: &K,
    ) -> bool {
        self.entries.get(name).is_some_and(|entry| entry.locked)
    }

    /// Returns false if the key is absent.
    pub(crate) fn lock(
        &mut self,
        name: &K,
    ) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.locked = true;
                true
            }
            None => false,
        }
    }

    /// Stores a plain value without classifying the write. A present key keeps
    /// its position and is overwritten, so later duplicates win.
    pub(crate) fn insert(
        &mut self,
        name: K,
        value: V,
    ) {
        self.entries.insert(
            name,
            SlotEntry {
                slot: Slot::Plain(value),
                locked: false,
            },
        );
    }

    /// Stores `value` under `name` unless the key is intercepted.
    ///
    /// Intercepted slots are left untouched: the returned entry must be written
    /// after every container lock is released, since the write may dispatch.
    pub(crate) fn write(
        &mut self,
        name: K,
        value: V,
    ) -> Write<K, V> {
        match self.entries.get_mut(&name) {
            None => {
                self.entries.insert(
                    name,
                    SlotEntry {
                        slot: Slot::Plain(value),
                        locked: false,
                    },
                );
                Write::Inserted
            }
            Some(entry) => match &mut entry.slot {
                Slot::Intercepted(watch) => Write::Intercepted(Arc::clone(watch)),
                Slot::Plain(current) if *current == value => Write::Unchanged,
                Slot::Plain(current) => Write::Replaced(std::mem::replace(current, value)),
            },
        }
    }

    /// Replaces the storage strategy of `name` with an intercepted slot,
    /// keeping the key's position. Absent keys are appended.
    pub(crate) fn intercept(
        &mut self,
        name: K,
        watch: Arc<WatchEntry<K, V>>,
    ) {
        match self.entries.get_mut(&name) {
            Some(entry) => entry.slot = Slot::Intercepted(watch),
            None => {
                self.entries.insert(
                    name,
                    SlotEntry {
                        slot: Slot::Intercepted(watch),
                        locked: false,
                    },
                );
            }
        }
    }

    /// Removes `name` unless it is locked. Preserves the order of the rest.
    pub(crate) fn remove(
        &mut self,
        name: &K,
    ) -> Option<Slot<K, V>> {
        if self.is_locked(name) {
            return None;
        }
        self.entries.shift_remove(name).map(|entry| entry.slot)
    }

    pub(crate) fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
