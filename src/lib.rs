//! Batched, asynchronous change notification for key/value containers.
//!
//! Two cooperating layers:
//!
//! - [`ObservableMap`]: an insertion-ordered key/value container whose `add`,
//!   `update`, `set` and `delete` calls are classified into [`ChangeRecord`]s and
//!   coalesced into one batch per listener, delivered on a later scheduler turn.
//! - [`WatchRegistry`]: exclusive per-key watches ("unique" observation) on any
//!   [`Watchable`] container. A watched key is served by an intercepted slot whose
//!   writes go to the watch listeners only and never reach the general batch.
//!
//! ```ignore
//! use kv_observer::{ChangeKinds, Listener, ObservableMap};
//!
//! let map = ObservableMap::with_values([("a", 1)]);
//! map.observe(Listener::new(|changes| println!("{changes:?}")));
//! map.set("a", 10).set("b", 2).delete(&"a");
//! // -> one batch: Update(a, old 1), Add(b), Delete(a, old 10)
//! ```

mod batch;
mod change;
mod config;
mod constants;
mod container;
mod errors;
mod slot;
mod watch;
pub(crate) mod utils;

pub use change::*;
pub use config::*;
pub use constants::*;
pub use container::*;
pub use errors::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
