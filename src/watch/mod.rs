//! Exclusive per-key watches ("unique" observation)
//!
//! A watch diverts one key of one container away from the container's general
//! change stream to a dedicated listener set.
//!
//! # How it works
//!
//! ```text
//! registry.watch(&map, "x", listener, initial)
//!        │
//!        ├── seed baseline (observable containers only, at most one general change)
//!        ├── lookup/create WatchEntry for (map.id(), "x") in the DashMap registry
//!        └── replace the storage of "x" with Slot::Intercepted(entry)
//!
//! map.set("x", 10)
//!        │  slot is intercepted
//!        ▼
//! entry.write(10) ── equal? ──> ignored
//!        │
//!        └── one deferred task per listener: [Update { name: "x", old_value }]
//! ```
//!
//! The general batcher never sees writes to an intercepted key. The exclusion
//! is structural: removing every watch listener keeps the slot intercepted.
//! Only deleting the key from the container removes the interception.
//!
//! # Lifetime
//!
//! Registrations live in an explicit [`WatchRegistry`] rather than in global
//! state. They are kept when their listener list empties and are released only
//! through the `dispose*`/`clear` methods.

mod entry;
mod registry;


pub use entry::WatchEntry;
pub use registry::{Watchable, WatchRegistry};
