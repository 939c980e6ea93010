//! Containers built from a loaded `ObserverConfig`.

use std::time::Duration;

use kv_observer::ChangeKind;
use kv_observer::ChangeKinds;
use kv_observer::ObservableMap;
use kv_observer::ObserverConfig;
use kv_observer::WatchRegistry;
use kv_observer::CONFIG_PATH_ENV;

use crate::common::key;
use crate::common::recording_listener;
use crate::common::summary;

#[tokio::test(start_paused = true)]
async fn test_flush_delay_from_config_file() {
    crate::enable_logger();

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("observer.toml");
    std::fs::write(
        &path,
        r#"
[batch]
flush_delay_ms = 200

[watch]
delivery_delay_ms = 20
"#,
    )
    .expect("write config");

    let config = temp_env::with_var(CONFIG_PATH_ENV, Some(path.to_str().expect("utf8 path")), || {
        ObserverConfig::new().and_then(ObserverConfig::validate)
    })
    .expect("valid config");
    assert_eq!(config.batch.flush_delay_ms, 200);

    let (listener, mut rx) = recording_listener();
    let (unique, mut unique_rx) = recording_listener();
    let map = ObservableMap::builder()
        .values([(key("a"), 1)])
        .listener(listener, ChangeKinds::ALL)
        .config(&config.batch)
        .registry(WatchRegistry::with_config(&config.watch))
        .build();

    map.unique(key("w"), Some(unique), Some(0));
    map.set(key("a"), 2).set(key("w"), 5);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(
        summary(&unique_rx.try_recv().expect("watch delivered after its own delay")),
        vec![(key("w"), ChangeKind::Update, Some(0))]
    );
    assert!(rx.try_recv().is_err());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        summary(&rx.try_recv().expect("batch flushed after the configured delay")),
        vec![(key("w"), ChangeKind::Add, None), (key("a"), ChangeKind::Update, Some(1))]
    );
}
