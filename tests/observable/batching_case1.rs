//! Case 1: one batch per listener for a burst of synchronous mutations
//!
//! Scenario:
//!
//! 1. A container starts with `{a: 1, b: 2}`.
//! 2. Three listeners register: all kinds, `{Delete}`, and `{Add, Update}`.
//! 3. `set(a, 10)`, `set(c, 0)`, `set(c, 1)`, `delete(c)`, `set(b, 2)`.
//!
//! Expected Result:
//!
//! - The all-kinds listener receives one batch with four records, in call order.
//! - The delete listener receives `[Delete c (old 1)]` only.
//! - The add/update listener receives the three remaining records.
//! - `set(b, 2)` produces nothing.

use kv_observer::ChangeKind;
use kv_observer::ChangeKinds;
use kv_observer::ObservableMap;

use crate::common::expect_silence;
use crate::common::key;
use crate::common::recording_listener;
use crate::common::recv_batch;
use crate::common::summary;

#[tokio::test]
async fn test_batching_case1() {
    crate::enable_logger();

    let map = ObservableMap::with_values([(key("a"), 1), (key("b"), 2)]);
    let (all, mut all_rx) = recording_listener();
    let (deletes, mut deletes_rx) = recording_listener();
    let (writes, mut writes_rx) = recording_listener();

    map.observe(all)
        .observe_with(deletes, ChangeKinds::only(ChangeKind::Delete))
        .observe_with(writes, "add,update".parse().expect("valid kinds"));

    map.set(key("a"), 10)
        .set(key("c"), 0)
        .set(key("c"), 1)
        .delete(&key("c"))
        .set(key("b"), 2);

    assert_eq!(
        summary(&recv_batch(&mut all_rx).await),
        vec![
            (key("a"), ChangeKind::Update, Some(1)),
            (key("c"), ChangeKind::Add, None),
            (key("c"), ChangeKind::Update, Some(0)),
            (key("c"), ChangeKind::Delete, Some(1)),
        ]
    );
    assert_eq!(
        summary(&recv_batch(&mut deletes_rx).await),
        vec![(key("c"), ChangeKind::Delete, Some(1))]
    );
    assert_eq!(recv_batch(&mut writes_rx).await.len(), 3);

    expect_silence(&mut all_rx).await;
    assert_eq!(map.keys(), vec![key("a"), key("b")]);
}
