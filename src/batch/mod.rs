//! Change batching
//!
//! Every observable container owns one [`ChangeBatcher`]: its listeners, the
//! pending change list, and a single debounced [`FlushTimer`].
//!
//! ```text
//! mutation ──> ChangeRecord ──> pending.push() ──> FlushTimer::rearm()
//!                                                   (abort previous timer,
//!                                                    bump generation)
//!                                  ...more mutations, same pending list...
//! timer fires (generation still current)
//!        │ take pending + snapshot listeners (under lock)
//!        ▼
//! PendingBatch::deliver()  (no lock held)
//!        └── per listener: filter by accepted kinds, call once if non-empty
//! ```
//!
//! Coalescing is cumulative with debounced reset: records accumulate in one
//! pending list until a flush fires, and every new record restarts the timer.

mod batcher;
mod flush_timer;


pub(crate) use batcher::*;
pub(crate) use flush_timer::*;
