use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;

use super::ObservableMapBuilder;
use crate::batch::ChangeBatcher;
use crate::slot::Slot;
use crate::slot::SlotMap;
use crate::slot::Write;
use crate::utils::async_task::spawn_deferred;
use crate::ChangeKinds;
use crate::ChangeRecord;
use crate::ContainerId;
use crate::Key;
use crate::Listener;
use crate::Value;
use crate::WatchEntry;
use crate::WatchRegistry;
use crate::Watchable;

pub(super) struct MapState<K, V> {
    pub(super) slots: SlotMap<K, V>,
    pub(super) batcher: ChangeBatcher<K, V>,
}

pub(super) struct ObservableInner<K, V> {
    pub(super) id: ContainerId,
    pub(super) registry: WatchRegistry<K, V>,
    pub(super) state: Mutex<MapState<K, V>>,
}

/// Insertion-ordered key/value container with batched change notification
///
/// `ObservableMap` is a handle: clones share the same container. Mutations are
/// synchronous and chainable; listeners are invoked later, once per flush,
/// with every pending change they accept.
///
/// # Example
/// ```ignore
/// let map = ObservableMap::new();
/// map.observe(Listener::new(|changes| println!("{changes:?}")));
/// map.set("a", 0).set("a", 1).delete(&"a");
/// // one batch: [Add a, Update a (old 0), Delete a (old 1)]
/// ```
///
/// Keys placed under a watch (see [`ObservableMap::unique`]) are served by an
/// intercepted slot and never appear in this container's batches.
pub struct ObservableMap<K, V> {
    inner: Arc<ObservableInner<K, V>>,
}

impl<K, V> Clone for ObservableMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Key, V: Value> Default for ObservableMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> ObservableMap<K, V> {
    pub fn builder() -> ObservableMapBuilder<K, V> {
        ObservableMapBuilder::new()
    }

    /// Empty container without listeners
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Container holding `values`; no change records are produced for them.
    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::builder().values(values).build()
    }

    /// Container holding `values`, observed by `listener` (if any) for the
    /// `accepted` change kinds.
    pub fn with_listener<I>(
        values: I,
        listener: Option<Listener<K, V>>,
        accepted: ChangeKinds,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut builder = Self::builder().values(values);
        if let Some(listener) = listener {
            builder = builder.listener(listener, accepted);
        }
        builder.build()
    }

    pub(super) fn from_inner(inner: ObservableInner<K, V>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.inner.id
    }

    /// The registry backing [`ObservableMap::unique`]
    pub fn registry(&self) -> &WatchRegistry<K, V> {
        &self.inner.registry
    }

    /// Stores `value` under a new key and records an `Add`.
    ///
    /// A present key is updated instead (see [`ObservableMap::update`]).
    pub fn add(
        &self,
        name: K,
        value: V,
    ) -> &Self {
        self.write(name, value)
    }

    /// Replaces the value of a present key and records an `Update` carrying
    /// the previous value. Equal values are a no-op.
    ///
    /// An absent key is added instead (see [`ObservableMap::add`]).
    pub fn update(
        &self,
        name: K,
        value: V,
    ) -> &Self {
        self.write(name, value)
    }

    /// Sugar for [`ObservableMap::add`], which picks add or update.
    pub fn set(
        &self,
        name: K,
        value: V,
    ) -> &Self {
        self.add(name, value)
    }

    /// Removes a key and records a `Delete` carrying the removed value.
    ///
    /// Absent and locked keys are left alone. Deleting a watched key removes
    /// the interception; the general listeners see a `Delete` carrying the
    /// captured value (none if the key never held one).
    pub fn delete(
        &self,
        name: &K,
    ) -> &Self {
        let mut state = self.inner.state.lock();

        if state.slots.is_locked(name) {
            debug!(container = %self.inner.id, key = ?name, "key is locked, delete ignored");
            return self;
        }

        match state.slots.remove(name) {
            None => {}
            Some(Slot::Intercepted(entry)) => {
                trace!(container = %self.inner.id, key = ?name, "watched key deleted, interception removed");
                if let Some(old_value) = entry.value() {
                    let record = ChangeRecord::deleted(name.clone(), self.inner.id, old_value);
                    self.enqueue(&mut state, record);
                }
            }
            Some(Slot::Plain(old_value)) => {
                let record = ChangeRecord::deleted(name.clone(), self.inner.id, old_value);
                self.enqueue(&mut state, record);
            }
        }
        self
    }

    /// Registers `listener` for every change kind.
    pub fn observe(
        &self,
        listener: Listener<K, V>,
    ) -> &Self {
        self.observe_with(listener, ChangeKinds::ALL)
    }

    /// Registers `listener` for the `accepted` change kinds.
    pub fn observe_with(
        &self,
        listener: Listener<K, V>,
        accepted: ChangeKinds,
    ) -> &Self {
        self.inner.state.lock().batcher.subscribe(listener, accepted);
        self
    }

    /// Removes the first registration of `listener`. It receives no batch
    /// flushed after this call, including changes already pending.
    pub fn unobserve(
        &self,
        listener: &Listener<K, V>,
    ) -> &Self {
        if !self.inner.state.lock().batcher.unsubscribe(listener) {
            trace!(container = %self.inner.id, "unobserve of unknown listener ignored");
        }
        self
    }

    /// Places `name` under an exclusive watch in this container's registry.
    ///
    /// See [`WatchRegistry::watch`]. From then on, writes to `name` notify the
    /// watch listeners only; this container's general listeners never see
    /// them again, even after every watch listener has been removed.
    pub fn unique(
        &self,
        name: K,
        listener: Option<Listener<K, V>>,
        initial_value: Option<V>,
    ) -> &Self {
        self.inner.registry.watch(self, name, listener, initial_value)
    }

    /// Removes a watch listener. See [`WatchRegistry::unwatch`].
    pub fn disunique(
        &self,
        name: &K,
        listener: &Listener<K, V>,
    ) -> &Self {
        self.inner.registry.unwatch(self, name, listener)
    }

    /// Current value, read through the interceptor for watched keys
    pub fn get(
        &self,
        name: &K,
    ) -> Option<V> {
        self.inner.state.lock().slots.get(name)
    }

    pub fn contains_key(
        &self,
        name: &K,
    ) -> bool {
        self.inner.state.lock().slots.contains(name)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<K> {
        self.inner.state.lock().slots.keys()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks a present key non-reconfigurable: it can still be written, but
    /// no longer deleted or placed under a watch. Returns false if absent.
    pub fn lock(
        &self,
        name: &K,
    ) -> bool {
        self.inner.state.lock().slots.lock(name)
    }

    pub fn is_watched(
        &self,
        name: &K,
    ) -> bool {
        self.inner.state.lock().slots.is_intercepted(name)
    }

    /// Cancels the scheduled flush and delivers pending changes now, on the
    /// calling thread. Returns the number of listeners invoked.
    ///
    /// This is also how pending changes get delivered when mutations happen
    /// outside of a tokio runtime.
    pub fn flush_now(&self) -> usize {
        let batch = {
            let mut state = self.inner.state.lock();
            state.batcher.timer.cancel();
            state.batcher.take_batch()
        };
        batch.map(|batch| batch.deliver()).unwrap_or(0)
    }

    /// Number of changes waiting for the next flush
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().batcher.pending_len()
    }

    pub fn is_flush_scheduled(&self) -> bool {
        self.inner.state.lock().batcher.timer.is_armed()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.state.lock().batcher.subscriber_count()
    }

    /// Shared add/update path: the outcome of the slot write decides the kind.
    fn write(
        &self,
        name: K,
        value: V,
    ) -> &Self {
        let mut state = self.inner.state.lock();

        let record = match state.slots.write(name.clone(), value.clone()) {
            Write::Inserted => ChangeRecord::added(name, self.inner.id),
            Write::Replaced(old_value) => ChangeRecord::updated(name, self.inner.id, Some(old_value)),
            Write::Unchanged => return self,
            Write::Intercepted(entry) => {
                drop(state);
                entry.write(value);
                return self;
            }
        };

        self.enqueue(&mut state, record);
        self
    }

    fn enqueue(
        &self,
        state: &mut MapState<K, V>,
        record: ChangeRecord<K, V>,
    ) {
        if state.batcher.enqueue(record) {
            self.schedule_flush(state);
        }
    }

    /// Cancels any armed flush and arms a new one.
    fn schedule_flush(
        &self,
        state: &mut MapState<K, V>,
    ) {
        let generation = state.batcher.timer.rearm();
        let delay = state.batcher.timer.delay();
        let inner = Arc::clone(&self.inner);

        match spawn_deferred("flush", delay, move || Self::flush(&inner, generation)) {
            Ok(handle) => state.batcher.timer.attach(handle),
            Err(_) => {
                debug!(
                    container = %self.inner.id,
                    pending = state.batcher.pending_len(),
                    "no async runtime, changes stay pending until flush_now()"
                );
            }
        }
    }

    fn flush(
        inner: &Arc<ObservableInner<K, V>>,
        generation: u64,
    ) {
        let batch = {
            let mut state = inner.state.lock();
            if !state.batcher.timer.fire(generation) {
                trace!(container = %inner.id, generation, "superseded flush skipped");
                return;
            }
            state.batcher.take_batch()
        };

        if let Some(batch) = batch {
            batch.deliver();
        }
    }
}

impl<K: Key, V: Value> Watchable<K, V> for ObservableMap<K, V> {
    fn container_id(&self) -> ContainerId {
        self.inner.id
    }

    fn is_reconfigurable(
        &self,
        name: &K,
    ) -> bool {
        !self.inner.state.lock().slots.is_locked(name)
    }

    fn current_value(
        &self,
        name: &K,
    ) -> Option<V> {
        self.get(name)
    }

    /// Writes the baseline through `set` semantics unless the key is already
    /// intercepted, so a re-watch never notifies the watch listeners.
    fn seed_baseline(
        &self,
        name: &K,
        value: &V,
    ) {
        if self.is_watched(name) {
            return;
        }
        self.set(name.clone(), value.clone());
    }

    fn intercepted_entry(
        &self,
        name: &K,
    ) -> Option<Arc<WatchEntry<K, V>>> {
        self.inner.state.lock().slots.intercepted_entry(name)
    }

    fn install_interceptor(
        &self,
        name: K,
        entry: Arc<WatchEntry<K, V>>,
    ) {
        self.inner.state.lock().slots.intercept(name, entry);
    }
}

impl<K: Key, V: Value> fmt::Debug for ObservableMap<K, V> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ObservableMap")
            .field("id", &self.inner.id)
            .field("keys", &state.slots.keys())
            .field("listeners", &state.batcher.subscriber_count())
            .field("pending", &state.batcher.pending_len())
            .finish()
    }
}
