//! Mutations issued from several threads share one container.

use std::collections::HashSet;

use kv_observer::ChangeKind;
use kv_observer::ObservableMap;

use crate::common::recording_listener;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_lose_no_record() {
    crate::enable_logger();

    let map: ObservableMap<String, u64> = ObservableMap::new();
    let (listener, mut rx) = recording_listener();
    map.observe(listener);

    let writers: Vec<_> = (0..4u64)
        .map(|writer| {
            let map = map.clone();
            tokio::task::spawn_blocking(move || {
                for i in 0..25u64 {
                    map.set(format!("w{}-{}", writer, i), i);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.await.expect("writer task");
    }

    let mut seen = HashSet::new();
    while seen.len() < 100 {
        let batch = crate::common::recv_batch(&mut rx).await;
        for record in batch {
            assert_eq!(record.kind, ChangeKind::Add);
            assert!(seen.insert(record.name));
        }
    }
    assert_eq!(map.len(), 100);
}
