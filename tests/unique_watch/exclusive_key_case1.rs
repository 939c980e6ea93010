//! Case 1: a uniquely watched key never reaches the general listener
//!
//! Scenario:
//!
//! 1. A container starts with `{a: 1, b: 1}` and a general listener.
//! 2. `unique(a, cb)`.
//! 3. `set(a, 2)`, `set(b, 2)`, `disunique(a, cb)`, `set(a, 3)`.
//!
//! Expected Result:
//!
//! - `cb` receives `[Update a (old 1)]` exactly once.
//! - The general listener receives `[Update b (old 1)]` only.
//! - After `disunique`, `a` is still excluded: nobody hears `set(a, 3)`.

use kv_observer::ChangeKind;
use kv_observer::ObservableMap;

use crate::common::expect_silence;
use crate::common::key;
use crate::common::recording_listener;
use crate::common::recv_batch;
use crate::common::summary;

#[tokio::test]
async fn test_exclusive_key_case1() {
    crate::enable_logger();

    let map = ObservableMap::with_values([(key("a"), 1), (key("b"), 1)]);
    let (general, mut general_rx) = recording_listener();
    let (unique, mut unique_rx) = recording_listener();

    map.observe(general).unique(key("a"), Some(unique.clone()), None);

    map.set(key("a"), 2).set(key("b"), 2);

    assert_eq!(
        summary(&recv_batch(&mut unique_rx).await),
        vec![(key("a"), ChangeKind::Update, Some(1))]
    );
    assert_eq!(
        summary(&recv_batch(&mut general_rx).await),
        vec![(key("b"), ChangeKind::Update, Some(1))]
    );

    map.disunique(&key("a"), &unique).set(key("a"), 3);

    expect_silence(&mut unique_rx).await;
    expect_silence(&mut general_rx).await;
    assert_eq!(map.get(&key("a")), Some(3));
}
