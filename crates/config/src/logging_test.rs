use super::*;

#[test]
fn test_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Full);
    assert!(config.filter.is_none());
}

#[test]
fn test_deserialize_from_toml() {
    let config: LogConfig = toml::from_str(
        r#"
        level = "debug"
        format = "compact"
        filter = "info,beacon_sinks=trace"
        "#,
    )
    .unwrap();

    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.filter.as_deref(), Some("info,beacon_sinks=trace"));
}

#[test]
fn test_level_directive_strings() {
    assert_eq!(LogLevel::Trace.as_str(), "trace");
    assert_eq!(LogLevel::Error.as_str(), "error");
}

#[test]
fn test_init_is_idempotent() {
    let config = LogConfig::default();
    config.init();
    // Second call must not panic even though a subscriber is installed.
    config.init();
}
