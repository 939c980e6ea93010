use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::slot::Slot;
use crate::slot::SlotMap;
use crate::slot::Write;
use crate::ContainerId;
use crate::Key;
use crate::Value;
use crate::WatchEntry;
use crate::Watchable;

struct PlainInner<K, V> {
    id: ContainerId,
    slots: Mutex<SlotMap<K, V>>,
}

/// Insertion-ordered key/value container without general change notification
///
/// Individual keys can still be placed under a watch with
/// [`WatchRegistry::watch`](crate::WatchRegistry::watch); writes to those keys
/// notify the watch listeners. Clones share the same container.
pub struct PlainMap<K, V> {
    inner: Arc<PlainInner<K, V>>,
}

impl<K, V> Clone for PlainMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Key, V: Value> Default for PlainMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> PlainMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PlainInner {
                id: ContainerId::next(),
                slots: Mutex::new(SlotMap::new()),
            }),
        }
    }

    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let map = Self::new();
        for (name, value) in values {
            map.set(name, value);
        }
        map
    }

    pub fn id(&self) -> ContainerId {
        self.inner.id
    }

    /// Assigns `value`; watched keys are written through their interceptor.
    pub fn set(
        &self,
        name: K,
        value: V,
    ) -> &Self {
        let outcome = self.inner.slots.lock().write(name, value.clone());
        if let Write::Intercepted(entry) = outcome {
            entry.write(value);
        }
        self
    }

    /// Removes `name`, returning its value. Locked keys are left alone.
    pub fn remove(
        &self,
        name: &K,
    ) -> Option<V> {
        let mut slots = self.inner.slots.lock();
        if slots.is_locked(name) {
            debug!(container = %self.inner.id, key = ?name, "key is locked, remove ignored");
            return None;
        }

        match slots.remove(name)? {
            Slot::Plain(value) => Some(value),
            Slot::Intercepted(entry) => entry.value(),
        }
    }

    pub fn get(
        &self,
        name: &K,
    ) -> Option<V> {
        self.inner.slots.lock().get(name)
    }

    pub fn contains_key(
        &self,
        name: &K,
    ) -> bool {
        self.inner.slots.lock().contains(name)
    }

    /// Marks a present key non-reconfigurable. Returns false if absent.
    pub fn lock(
        &self,
        name: &K,
    ) -> bool {
        self.inner.slots.lock().lock(name)
    }

    pub fn is_watched(
        &self,
        name: &K,
    ) -> bool {
        self.inner.slots.lock().is_intercepted(name)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<K> {
        self.inner.slots.lock().keys()
    }

    pub fn len(&self) -> usize {
        self.inner.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Key, V: Value> Watchable<K, V> for PlainMap<K, V> {
    fn container_id(&self) -> ContainerId {
        self.inner.id
    }

    fn is_reconfigurable(
        &self,
        name: &K,
    ) -> bool {
        !self.inner.slots.lock().is_locked(name)
    }

    fn current_value(
        &self,
        name: &K,
    ) -> Option<V> {
        self.get(name)
    }

    fn intercepted_entry(
        &self,
        name: &K,
    ) -> Option<Arc<WatchEntry<K, V>>> {
        self.inner.slots.lock().intercepted_entry(name)
    }

    fn install_interceptor(
        &self,
        name: K,
        entry: Arc<WatchEntry<K, V>>,
    ) {
        self.inner.slots.lock().intercept(name, entry);
    }
}

impl<K: Key, V: Value> fmt::Debug for PlainMap<K, V> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("PlainMap")
            .field("id", &self.inner.id)
            .field("keys", &self.keys())
            .finish()
    }
}
