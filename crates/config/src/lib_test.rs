use super::*;

const FULL: &str = r#"
[logging]
level = "debug"
format = "compact"

[credentials]
endpoint = "https://collector.example/statements"
key = "file-key"

[sinks.session_log]
type = "line_file"
base_dir = "documents"
identifier = "session-{%Y%m%d}"

[sinks.gaze_csv]
type = "tabular_file"
sharding = "per_composer"
exclude = "^debug\\."
batching = 64

[sinks.collector]
type = "http"
enabled = false
"#;

#[test]
fn test_parse_full_config() {
    let config: Config = FULL.parse().unwrap();

    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.credentials.key.as_deref(), Some("file-key"));
    assert_eq!(config.sinks.len(), 3);
    assert!(matches!(
        config.sinks.get("session_log"),
        Some(SinkSpec::LineFile(_))
    ));
}

#[test]
fn test_empty_config_is_valid() {
    let config: Config = "".parse().unwrap();
    assert!(config.sinks.is_empty());
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(config.credentials.resolve().is_none());
}

#[test]
fn test_enabled_sinks_skips_disabled() {
    let config: Config = FULL.parse().unwrap();
    let names: Vec<&str> = config.enabled_sinks().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["gaze_csv", "session_log"]);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let result: Result<Config> = "sinks = 3".parse();
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("beacon.toml");
    std::fs::write(&path, FULL).unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.sinks.len(), 3);

    assert!(matches!(
        Config::load(dir.path().join("missing.toml")),
        Err(ConfigError::Io(_))
    ));
}
