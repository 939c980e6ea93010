//! A builder for [`ObservableMap`] instances.
//!
//! ## Key Design Points
//! - **Defaults**: empty container, no listeners, [`BatchConfig::default`] and a
//!   private [`WatchRegistry`].
//! - **Customization**: initial values, listeners, batch configuration, and a
//!   registry shared with other containers.
//! - `build()` never fails; nothing is scheduled until the first mutation.
//!
//! ## Example
//! ```ignore
//! let config = ObserverConfig::new()?.validate()?;
//! let registry = WatchRegistry::with_config(&config.watch);
//!
//! let map = ObservableMap::builder()
//!     .values([("a", 1), ("b", 2)])
//!     .listener(listener, ChangeKinds::only(ChangeKind::Delete))
//!     .config(&config.batch)
//!     .registry(registry.clone())
//!     .build();
//! ```

use parking_lot::Mutex;

use super::observable::MapState;
use super::observable::ObservableInner;
use super::ObservableMap;
use crate::batch::ChangeBatcher;
use crate::slot::SlotMap;
use crate::BatchConfig;
use crate::ChangeKinds;
use crate::ContainerId;
use crate::Key;
use crate::Listener;
use crate::Value;
use crate::WatchRegistry;

pub struct ObservableMapBuilder<K, V> {
    values: Vec<(K, V)>,
    listeners: Vec<(Listener<K, V>, ChangeKinds)>,
    config: BatchConfig,
    registry: Option<WatchRegistry<K, V>>,
}

impl<K: Key, V: Value> Default for ObservableMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> ObservableMapBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            listeners: Vec::new(),
            config: BatchConfig::default(),
            registry: None,
        }
    }

    /// Initial values, stored without producing change records
    pub fn values<I>(
        mut self,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.values.extend(values);
        self
    }

    pub fn listener(
        mut self,
        listener: Listener<K, V>,
        accepted: ChangeKinds,
    ) -> Self {
        self.listeners.push((listener, accepted));
        self
    }

    pub fn config(
        mut self,
        config: &BatchConfig,
    ) -> Self {
        self.config = config.clone();
        self
    }

    /// Registry used by `unique`/`disunique`; shared with its other clones.
    pub fn registry(
        mut self,
        registry: WatchRegistry<K, V>,
    ) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> ObservableMap<K, V> {
        let id = ContainerId::next();

        let mut slots = SlotMap::new();
        for (name, value) in self.values {
            slots.insert(name, value);
        }

        let mut batcher = ChangeBatcher::new(id, &self.config);
        for (listener, accepted) in self.listeners {
            batcher.subscribe(listener, accepted);
        }

        ObservableMap::from_inner(ObservableInner {
            id,
            registry: self.registry.unwrap_or_default(),
            state: Mutex::new(MapState { slots, batcher }),
        })
    }
}
