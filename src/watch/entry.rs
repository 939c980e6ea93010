use std::fmt::Debug;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;

use crate::utils::async_task::spawn_deferred;
use crate::ChangeRecord;
use crate::ContainerId;
use crate::Key;
use crate::Listener;
use crate::Value;

struct EntryState<K, V> {
    listeners: Vec<Listener<K, V>>,
    /// Captured value served by the intercepted slot (`None` until first written)
    value: Option<V>,
}

/// Watch registration for one `(container, key)` pair
///
/// Shared between the [`WatchRegistry`](crate::WatchRegistry) that owns it and
/// the intercepted slot installed in the watched container. Reads of the key
/// return the captured value; writes go through [`WatchEntry::write`].
pub struct WatchEntry<K, V> {
    container: ContainerId,
    name: K,
    delivery_delay: Duration,
    state: Mutex<EntryState<K, V>>,
}

impl<K: Key, V: Value> WatchEntry<K, V> {
    pub(crate) fn new(
        container: ContainerId,
        name: K,
        delivery_delay: Duration,
    ) -> Self {
        Self {
            container,
            name,
            delivery_delay,
            state: Mutex::new(EntryState {
                listeners: Vec::new(),
                value: None,
            }),
        }
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn name(&self) -> &K {
        &self.name
    }

    /// Current captured value
    pub fn value(&self) -> Option<V> {
        self.state.lock().value.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Assigns through the interceptor.
    ///
    /// Equal values are ignored. Otherwise the captured value is replaced and
    /// every registered listener is scheduled independently with its own
    /// one-record batch `[Update { old_value }]`.
    pub fn write(
        &self,
        value: V,
    ) {
        let (old_value, listeners) = {
            let mut state = self.state.lock();
            if state.value.as_ref() == Some(&value) {
                return;
            }
            let old_value = state.value.replace(value);
            (old_value, state.listeners.clone())
        };

        trace!(
            container = %self.container,
            key = ?self.name,
            listeners = listeners.len(),
            "intercepted write"
        );

        for listener in listeners {
            let change = vec![ChangeRecord::updated(
                self.name.clone(),
                self.container,
                old_value.clone(),
            )];
            self.deliver(listener, change);
        }
    }

    fn deliver(
        &self,
        listener: Listener<K, V>,
        change: Vec<ChangeRecord<K, V>>,
    ) {
        let scheduled = spawn_deferred("watch_delivery", self.delivery_delay, move || {
            listener.call(&change)
        });

        if let Err(deliver) = scheduled {
            debug!(
                container = %self.container,
                key = ?self.name,
                "no async runtime, delivering watch change inline"
            );
            deliver();
        }
    }

    pub(crate) fn reset_value(
        &self,
        value: Option<V>,
    ) {
        self.state.lock().value = value;
    }

    pub(crate) fn add_listener(
        &self,
        listener: Listener<K, V>,
    ) {
        self.state.lock().listeners.push(listener);
    }

    /// Removes the first listener with the same identity.
    pub(crate) fn remove_listener(
        &self,
        listener: &Listener<K, V>,
    ) -> bool {
        let mut state = self.state.lock();
        match state.listeners.iter().position(|l| l == listener) {
            Some(index) => {
                state.listeners.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<K: Debug, V> Debug for WatchEntry<K, V> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WatchEntry")
            .field("container", &self.container)
            .field("name", &self.name)
            .field("delivery_delay", &self.delivery_delay)
            .finish_non_exhaustive()
    }
}
