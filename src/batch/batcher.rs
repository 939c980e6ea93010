use std::time::Duration;

use tracing::trace;
use tracing::warn;

use super::FlushTimer;
use crate::BatchConfig;
use crate::ChangeKinds;
use crate::ChangeRecord;
use crate::ContainerId;
use crate::Key;
use crate::Listener;
use crate::Value;

/// A registered listener and the change kinds it accepts
pub(crate) struct Subscriber<K, V> {
    pub(crate) listener: Listener<K, V>,
    pub(crate) accepted: ChangeKinds,
}

impl<K, V> Clone for Subscriber<K, V> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
            accepted: self.accepted,
        }
    }
}

/// Per-container listener list, pending changes and flush timer
pub(crate) struct ChangeBatcher<K, V> {
    container: ContainerId,
    subscribers: Vec<Subscriber<K, V>>,
    pending: Vec<ChangeRecord<K, V>>,
    pending_warn_threshold: usize,
    pub(crate) timer: FlushTimer,
}

impl<K: Key, V: Value> ChangeBatcher<K, V> {
    pub(crate) fn new(
        container: ContainerId,
        config: &BatchConfig,
    ) -> Self {
        Self {
            container,
            subscribers: Vec::new(),
            pending: Vec::new(),
            pending_warn_threshold: config.pending_warn_threshold,
            timer: FlushTimer::new(Duration::from_millis(config.flush_delay_ms)),
        }
    }

    pub(crate) fn subscribe(
        &mut self,
        listener: Listener<K, V>,
        accepted: ChangeKinds,
    ) {
        self.subscribers.push(Subscriber { listener, accepted });
    }

    /// Removes the first subscriber with the same listener identity.
    pub(crate) fn unsubscribe(
        &mut self,
        listener: &Listener<K, V>,
    ) -> bool {
        match self.subscribers.iter().position(|s| &s.listener == listener) {
            Some(index) => {
                self.subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Appends `record` to the pending list.
    ///
    /// Returns false (and drops the record) when nobody is subscribed: a
    /// listener registered later does not see earlier changes.
    pub(crate) fn enqueue(
        &mut self,
        record: ChangeRecord<K, V>,
    ) -> bool {
        if self.subscribers.is_empty() {
            trace!(container = %self.container, key = ?record.name, "no listeners, change dropped");
            return false;
        }

        trace!(
            container = %self.container,
            key = ?record.name,
            kind = %record.kind,
            pending = self.pending.len() + 1,
            "change enqueued"
        );
        self.pending.push(record);

        if self.pending.len() > self.pending_warn_threshold {
            warn!(
                container = %self.container,
                pending = self.pending.len(),
                threshold = self.pending_warn_threshold,
                "pending change batch is large; is the flush able to run?"
            );
        }
        true
    }

    /// Takes the whole pending list together with a snapshot of the current
    /// subscribers. `None` when nothing is pending.
    pub(crate) fn take_batch(&mut self) -> Option<PendingBatch<K, V>> {
        if self.pending.is_empty() {
            return None;
        }

        Some(PendingBatch {
            container: self.container,
            records: std::mem::take(&mut self.pending),
            subscribers: self.subscribers.clone(),
        })
    }
}

/// A flushed batch, delivered outside of any container lock
pub(crate) struct PendingBatch<K, V> {
    container: ContainerId,
    records: Vec<ChangeRecord<K, V>>,
    subscribers: Vec<Subscriber<K, V>>,
}

impl<K: Key, V: Value> PendingBatch<K, V> {
    /// Invokes every subscriber at most once with the records it accepts, in
    /// chronological order. Returns the number of listeners invoked.
    pub(crate) fn deliver(self) -> usize {
        let mut invoked = 0;

        for subscriber in &self.subscribers {
            let accepted: Vec<ChangeRecord<K, V>> = self
                .records
                .iter()
                .filter(|record| subscriber.accepted.contains(record.kind))
                .cloned()
                .collect();

            if accepted.is_empty() {
                continue;
            }

            subscriber.listener.call(&accepted);
            invoked += 1;
        }

        trace!(
            container = %self.container,
            records = self.records.len(),
            invoked,
            "batch delivered"
        );
        invoked
    }
}
