use monitor_config::{AppConfig, ConfigError};

// 环境变量是进程级共享状态，所有断言放在同一个测试里顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("MONITOR_MQTT_HOST", "broker.local");
        std::env::set_var("MONITOR_MQTT_PORT", "1884");
        std::env::set_var("MONITOR_HOME_TOPIC_PREFIX", "/home/x/");
        std::env::set_var("MONITOR_DOOR_SENSORS", "a, b, c, d");
        std::env::set_var("MONITOR_UTC_OFFSET_MINUTES", "120");
        std::env::set_var("MONITOR_INGEST", "off");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.mqtt_host, "broker.local");
    assert_eq!(config.mqtt_port, 1884);
    assert_eq!(config.home_topic_prefix, "home/x");
    assert_eq!(config.sensor_topic_prefix, "zigbee2mqtt");
    assert_eq!(config.mqtt_topics, vec!["home/x/#", "zigbee2mqtt/#"]);
    assert_eq!(config.door_sensors, vec!["a", "b", "c", "d"]);
    assert_eq!(config.leak_sensors.len(), 3);
    assert_eq!(config.mailbox_capacity, 10);
    assert_eq!(config.clock_interval_seconds, 5);
    assert_eq!(config.idle_timeout_seconds, 10);
    assert_eq!(config.utc_offset_minutes, Some(120));
    assert!(config.time_synced);
    assert!(!config.ingest_enabled);

    unsafe {
        std::env::set_var("MONITOR_LEAK_SENSORS", "only_one");
    }
    let err = AppConfig::from_env().expect_err("leak sensor count");
    assert!(matches!(err, ConfigError::Invalid(ref key, _) if key == "MONITOR_LEAK_SENSORS"));

    unsafe {
        std::env::remove_var("MONITOR_LEAK_SENSORS");
        std::env::set_var("MONITOR_MAILBOX_CAPACITY", "4");
    }
    let err = AppConfig::from_env().expect_err("mailbox capacity");
    assert_eq!(err.to_string(), "invalid value for MONITOR_MAILBOX_CAPACITY: 4");
}
