//! Watch registry: exclusive per-key observation on any container.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::WatchEntry;
use crate::ContainerId;
use crate::Key;
use crate::Listener;
use crate::Value;
use crate::WatchConfig;

/// A container whose keys can be placed under a watch
///
/// Implemented by [`ObservableMap`](crate::ObservableMap) and
/// [`PlainMap`](crate::PlainMap). Implementors must route every later write of
/// an intercepted key through [`WatchEntry::write`] and serve reads from
/// [`WatchEntry::value`].
pub trait Watchable<K: Key, V: Value> {
    fn container_id(&self) -> ContainerId;

    /// False when `name` is present and locked.
    fn is_reconfigurable(
        &self,
        name: &K,
    ) -> bool;

    fn current_value(
        &self,
        name: &K,
    ) -> Option<V>;

    /// The entry currently intercepting `name`, whichever registry created it
    fn intercepted_entry(
        &self,
        name: &K,
    ) -> Option<Arc<WatchEntry<K, V>>>;

    /// Writes the baseline value before interception is installed.
    ///
    /// Plain containers have nothing to notify and keep the default no-op.
    fn seed_baseline(
        &self,
        _name: &K,
        _value: &V,
    ) {
    }

    /// Replaces the storage of `name` with an intercepted slot backed by `entry`.
    fn install_interceptor(
        &self,
        name: K,
        entry: Arc<WatchEntry<K, V>>,
    );
}

struct WatchRegistryInner<K, V> {
    /// Registrations keyed by (container, key); at most one per pair
    entries: DashMap<(ContainerId, K), Arc<WatchEntry<K, V>>>,

    config: WatchConfig,
}

/// Registry of watch registrations
///
/// An explicit context object: whoever installs interceptors owns (a clone of)
/// the registry. Cloning is cheap and clones share the same registrations.
///
/// Registrations are never removed implicitly, not even when their last
/// listener is removed; use [`WatchRegistry::dispose`],
/// [`WatchRegistry::dispose_container`] or [`WatchRegistry::clear`].
pub struct WatchRegistry<K, V> {
    inner: Arc<WatchRegistryInner<K, V>>,
}

impl<K, V> Clone for WatchRegistry<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Key, V: Value> Default for WatchRegistry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> WatchRegistry<K, V> {
    pub fn new() -> Self {
        Self::with_config(&WatchConfig::default())
    }

    pub fn with_config(config: &WatchConfig) -> Self {
        Self {
            inner: Arc::new(WatchRegistryInner {
                entries: DashMap::new(),
                config: config.clone(),
            }),
        }
    }

    /// Places `name` of `container` under a watch.
    ///
    /// 1. Silently does nothing if `name` is present and locked.
    /// 2. The starting value is `initial_value`, else the current value.
    /// 3. Observable containers get the starting value written through `set`
    ///    semantics, so their general listeners see at most one change.
    /// 4. The shared registration is looked up or created; `listener` is
    ///    appended if given.
    /// 5. The key's storage is replaced by an intercepted slot: from then on,
    ///    writes of a different value notify the watch listeners only.
    ///
    /// Watching an already watched key re-installs the slot, resetting the
    /// captured value to the new starting value. The key keeps a single
    /// registration: its current entry is reused even when another registry
    /// installed it.
    pub fn watch<'c, C>(
        &self,
        container: &'c C,
        name: K,
        listener: Option<Listener<K, V>>,
        initial_value: Option<V>,
    ) -> &'c C
    where
        C: Watchable<K, V> + ?Sized,
    {
        let container_id = container.container_id();

        if !container.is_reconfigurable(&name) {
            debug!(container = %container_id, key = ?name, "key is locked, watch ignored");
            return container;
        }

        let start = initial_value.or_else(|| container.current_value(&name));
        if let Some(value) = &start {
            container.seed_baseline(&name, value);
        }

        // An intercepted key keeps its entry, even one created by another
        // registry; this registry adopts it.
        let entry = match container.intercepted_entry(&name) {
            Some(existing) => self.adopt(container_id, &name, existing),
            None => self.entry(container_id, &name),
        };
        entry.reset_value(start);
        if let Some(listener) = listener {
            entry.add_listener(listener);
        }

        trace!(
            container = %container_id,
            key = ?name,
            listeners = entry.listener_count(),
            "watch installed"
        );

        container.install_interceptor(name, entry);
        container
    }

    /// Removes the first watch listener with the same identity.
    ///
    /// Unknown pairs are a no-op. Neither the intercepted slot nor the
    /// registration is removed, so the key stays excluded from general
    /// notification even with zero watch listeners.
    pub fn unwatch<'c, C>(
        &self,
        container: &'c C,
        name: &K,
        listener: &Listener<K, V>,
    ) -> &'c C
    where
        C: Watchable<K, V> + ?Sized,
    {
        let container_id = container.container_id();

        match container
            .intercepted_entry(name)
            .or_else(|| self.get(container_id, name))
        {
            Some(entry) => {
                if !entry.remove_listener(listener) {
                    trace!(container = %container_id, key = ?name, "listener not registered");
                }
            }
            None => {
                trace!(container = %container_id, key = ?name, "unwatch on unknown key ignored");
            }
        }

        container
    }

    /// Drops the registration for `(container, name)`.
    ///
    /// An intercepted slot already installed keeps its (now detached) entry;
    /// a later `watch` of the same pair adopts that entry again.
    pub fn dispose(
        &self,
        container: ContainerId,
        name: &K,
    ) -> bool {
        self.inner.entries.remove(&(container, name.clone())).is_some()
    }

    /// Drops every registration of `container`, returning how many were removed.
    pub fn dispose_container(
        &self,
        container: ContainerId,
    ) -> usize {
        let before = self.inner.entries.len();
        self.inner.entries.retain(|(id, _), _| *id != container);
        let removed = before.saturating_sub(self.inner.entries.len());

        debug!(container = %container, removed, "registrations disposed");
        removed
    }

    pub fn clear(&self) {
        self.inner.entries.clear();
    }

    /// Number of watch listeners registered for `(container, name)`
    pub fn listener_count(
        &self,
        container: ContainerId,
        name: &K,
    ) -> usize {
        self.get(container, name).map(|entry| entry.listener_count()).unwrap_or(0)
    }

    /// Number of registrations
    pub fn watched_count(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn config(&self) -> &WatchConfig {
        &self.inner.config
    }

    fn get(
        &self,
        container: ContainerId,
        name: &K,
    ) -> Option<Arc<WatchEntry<K, V>>> {
        self.inner
            .entries
            .get(&(container, name.clone()))
            .map(|entry| Arc::clone(entry.value()))
    }

    fn adopt(
        &self,
        container: ContainerId,
        name: &K,
        existing: Arc<WatchEntry<K, V>>,
    ) -> Arc<WatchEntry<K, V>> {
        let replaced = self
            .inner
            .entries
            .insert((container, name.clone()), Arc::clone(&existing));

        if !replaced.is_some_and(|previous| Arc::ptr_eq(&previous, &existing)) {
            trace!(container = %container, key = ?name, "adopted registration installed elsewhere");
        }
        existing
    }

    fn entry(
        &self,
        container: ContainerId,
        name: &K,
    ) -> Arc<WatchEntry<K, V>> {
        let delay = Duration::from_millis(self.inner.config.delivery_delay_ms);
        let entry = Arc::clone(
            self.inner
                .entries
                .entry((container, name.clone()))
                .or_insert_with(|| Arc::new(WatchEntry::new(container, name.clone(), delay)))
                .value(),
        );

        let registered = self.inner.entries.len();
        if registered > self.inner.config.registry_warn_threshold {
            warn!(
                registered,
                threshold = self.inner.config.registry_warn_threshold,
                "watch registry is growing; dispose registrations that are no longer needed"
            );
        }

        entry
    }
}

impl<K: Key, V> std::fmt::Debug for WatchRegistry<K, V> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WatchRegistry")
            .field("watched", &self.inner.entries.len())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
