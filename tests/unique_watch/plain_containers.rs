//! Static watches on containers without general notification.

use kv_observer::ChangeKind;
use kv_observer::PlainMap;
use kv_observer::WatchRegistry;

use crate::common::expect_silence;
use crate::common::key;
use crate::common::recording_listener;
use crate::common::recv_batch;
use crate::common::summary;

#[tokio::test]
async fn test_watches_are_scoped_to_their_container() {
    crate::enable_logger();

    let registry = WatchRegistry::new();
    let obj1 = PlainMap::with_values([(key("x"), 1)]);
    let obj2 = PlainMap::with_values([(key("x"), 7)]);
    let (cb1, mut rx1) = recording_listener();
    let (cb2, mut rx2) = recording_listener();

    registry.watch(&obj1, key("x"), Some(cb1), None);
    registry.watch(&obj2, key("x"), Some(cb2), None);

    obj1.set(key("x"), 10);

    let batch = recv_batch(&mut rx1).await;
    assert_eq!(summary(&batch), vec![(key("x"), ChangeKind::Update, Some(1))]);
    assert_eq!(batch[0].container, obj1.id());
    expect_silence(&mut rx2).await;

    assert_eq!(registry.dispose_container(obj1.id()), 1);
    assert_eq!(registry.watched_count(), 1);
}
