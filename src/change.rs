//! Change records, change-kind filters and listener handles.

use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::Error;

/// Bounds required of container keys.
pub trait Key: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
impl<T> Key for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Bounds required of container values. Change detection is equality only.
pub trait Value: Clone + PartialEq + Debug + Send + Sync + 'static {}
impl<T> Value for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// Kind of a single property mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A key that was not present has been stored
    Add,
    /// A present key now holds a different value
    Update,
    /// A present key has been removed
    Delete,
}

impl ChangeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            ChangeKind::Add => 0b001,
            ChangeKind::Update => 0b010,
            ChangeKind::Delete => 0b100,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(ChangeKind::Add),
            "update" => Ok(ChangeKind::Update),
            "delete" => Ok(ChangeKind::Delete),
            other => Err(Error::InvalidChangeKind(other.to_string())),
        }
    }
}

/// The subset of change kinds a listener accepts
///
/// Defaults to all three kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeKinds(u8);

impl ChangeKinds {
    pub const ALL: ChangeKinds = ChangeKinds(0b111);
    pub const NONE: ChangeKinds = ChangeKinds(0);

    pub const fn only(kind: ChangeKind) -> Self {
        ChangeKinds(kind.bit())
    }

    pub const fn with(
        self,
        kind: ChangeKind,
    ) -> Self {
        ChangeKinds(self.0 | kind.bit())
    }

    pub const fn contains(
        self,
        kind: ChangeKind,
    ) -> bool {
        self.0 & kind.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ChangeKind> {
        [ChangeKind::Add, ChangeKind::Update, ChangeKind::Delete]
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl Default for ChangeKinds {
    fn default() -> Self {
        ChangeKinds::ALL
    }
}

impl Debug for ChangeKinds {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<ChangeKind> for ChangeKinds {
    fn from(kind: ChangeKind) -> Self {
        ChangeKinds::only(kind)
    }
}

impl<const N: usize> From<[ChangeKind; N]> for ChangeKinds {
    fn from(kinds: [ChangeKind; N]) -> Self {
        kinds.into_iter().collect()
    }
}

impl FromIterator<ChangeKind> for ChangeKinds {
    fn from_iter<I: IntoIterator<Item = ChangeKind>>(iter: I) -> Self {
        iter.into_iter().fold(ChangeKinds::NONE, ChangeKinds::with)
    }
}

impl FromStr for ChangeKinds {
    type Err = Error;

    /// Parses a comma separated list, e.g. `"update,delete"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(ChangeKind::from_str)
            .collect()
    }
}

/// Process-unique identity of a container
///
/// Records carry the id of the container they were produced by; the watch
/// registry keys its entries by `(ContainerId, key)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

impl ContainerId {
    pub(crate) fn next() -> Self {
        ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "container-{}", self.0)
    }
}

/// One property mutation. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord<K, V> {
    /// The key that changed
    pub name: K,
    /// Type of change
    pub kind: ChangeKind,
    /// The container the change happened in
    pub container: ContainerId,
    /// Previous value; always `None` for `Add`. An `Update` delivered by a
    /// watch on a key that had no value yet also carries `None`.
    pub old_value: Option<V>,
}

impl<K, V> ChangeRecord<K, V> {
    pub(crate) fn added(
        name: K,
        container: ContainerId,
    ) -> Self {
        Self {
            name,
            kind: ChangeKind::Add,
            container,
            old_value: None,
        }
    }

    pub(crate) fn updated(
        name: K,
        container: ContainerId,
        old_value: Option<V>,
    ) -> Self {
        Self {
            name,
            kind: ChangeKind::Update,
            container,
            old_value,
        }
    }

    pub(crate) fn deleted(
        name: K,
        container: ContainerId,
        old_value: V,
    ) -> Self {
        Self {
            name,
            kind: ChangeKind::Delete,
            container,
            old_value: Some(old_value),
        }
    }
}

type Callback<K, V> = dyn Fn(&[ChangeRecord<K, V>]) + Send + Sync;

/// Shared change listener
///
/// Identity is the identity of the wrapped callback: clones of a `Listener`
/// compare equal and are "the same listener" for `unobserve`/`unwatch`, while
/// two listeners built from identical closures are distinct.
pub struct Listener<K, V>(Arc<Callback<K, V>>);

impl<K, V> Listener<K, V> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&[ChangeRecord<K, V>]) + Send + Sync + 'static,
    {
        Listener(Arc::new(callback))
    }

    pub(crate) fn call(
        &self,
        changes: &[ChangeRecord<K, V>],
    ) {
        (self.0)(changes)
    }
}

impl<K, V> Clone for Listener<K, V> {
    fn clone(&self) -> Self {
        Listener(Arc::clone(&self.0))
    }
}

impl<K, V> PartialEq for Listener<K, V> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<K, V> Eq for Listener<K, V> {}

impl<K, V> Debug for Listener<K, V> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}
