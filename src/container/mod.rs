//! Key/value containers
//!
//! - [`ObservableMap`]: batched change notification for every key, plus
//!   exclusive watches on individual keys.
//! - [`PlainMap`]: no general notification; individual keys can be watched.
//!
//! Both keep keys in insertion order and never expose their bookkeeping
//! (listeners, pending changes, watch state) through `keys()`/`len()`.

mod builder;
mod observable;
mod plain;


pub use builder::ObservableMapBuilder;
pub use observable::ObservableMap;
pub use plain::PlainMap;
