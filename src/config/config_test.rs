use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::Error;

fn cleanup_all_observer_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("OBSERVER__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = ObserverConfig::default();

    assert_eq!(config.batch.flush_delay_ms, 0);
    assert_eq!(config.batch.pending_warn_threshold, 10_000);
    assert_eq!(config.watch.delivery_delay_ms, 0);
    assert_eq!(config.watch.registry_warn_threshold, 10_000);
}

#[test]
#[serial]
fn new_should_load_defaults_without_sources() {
    cleanup_all_observer_env_vars();
    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let config = ObserverConfig::new().unwrap();

        assert_eq!(config.batch, BatchConfig::default());
        assert_eq!(config.watch, WatchConfig::default());
    });
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_observer_env_vars();
    with_vars(
        vec![
            ("OBSERVER__BATCH__FLUSH_DELAY_MS", Some("25")),
            ("OBSERVER__WATCH__DELIVERY_DELAY_MS", Some("5")),
        ],
        || {
            let config = ObserverConfig::new().unwrap();

            assert_eq!(config.batch.flush_delay_ms, 25);
            assert_eq!(config.watch.delivery_delay_ms, 5);
            assert_eq!(config.batch.pending_warn_threshold, 10_000);
        },
    );
}

#[test]
#[serial]
fn new_should_read_file_from_config_path() {
    cleanup_all_observer_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("observer.toml");
    std::fs::write(
        &config_path,
        r#"
        [batch]
        flush_delay_ms = 40
        "#,
    )
    .unwrap();

    with_vars(vec![("CONFIG_PATH", config_path.to_str())], || {
        let config = ObserverConfig::new().unwrap();

        assert_eq!(config.batch.flush_delay_ms, 40);
        assert_eq!(config.watch, WatchConfig::default());
    });
}

#[test]
#[serial]
fn new_should_fail_when_config_path_is_missing() {
    cleanup_all_observer_env_vars();
    with_vars(vec![("CONFIG_PATH", Some("/definitely/not/here/observer.toml"))], || {
        let result = ObserverConfig::new();

        assert!(matches!(result, Err(Error::Config(_))));
    });
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_observer_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("override.toml");
    std::fs::write(
        &config_path,
        r#"
        [batch]
        pending_warn_threshold = 500

        [watch]
        registry_warn_threshold = 64
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = ObserverConfig::new().expect("success");
        let result = base_config.with_override_config(config_path.to_str().unwrap());

        assert!(result.is_ok());
        let config = result.unwrap();

        assert_eq!(config.batch.pending_warn_threshold, 500);
        assert_eq!(config.batch.flush_delay_ms, 0);
        assert_eq!(config.watch.registry_warn_threshold, 64);
    });
}

#[test]
#[serial]
fn environment_should_take_priority_over_override_file() {
    cleanup_all_observer_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("override.toml");
    std::fs::write(
        &config_path,
        r#"
        [batch]
        flush_delay_ms = 100
        "#,
    )
    .unwrap();

    with_vars(vec![("OBSERVER__BATCH__FLUSH_DELAY_MS", Some("7"))], || {
        let config = ObserverConfig::default()
            .with_override_config(config_path.to_str().unwrap())
            .unwrap();

        assert_eq!(config.batch.flush_delay_ms, 7);
    });
}

#[test]
fn validation_should_pass_for_defaults() {
    assert!(ObserverConfig::default().validate().is_ok());
}

#[test]
fn validation_should_fail_with_zero_pending_threshold() {
    let mut config = ObserverConfig::default();
    config.batch.pending_warn_threshold = 0;

    let result = config.validate();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn validation_should_fail_with_zero_registry_threshold() {
    let mut config = ObserverConfig::default();
    config.watch.registry_warn_threshold = 0;

    let result = config.validate();
    assert!(matches!(result, Err(Error::Config(_))));
}
