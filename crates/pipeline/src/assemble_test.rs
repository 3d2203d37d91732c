use super::*;

use std::time::{Duration, Instant};

use beacon_sinks::DeliveryMode;

fn parse(toml_src: &str) -> Config {
    toml_src.parse().unwrap()
}

fn wait_until(pred: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    pred()
}

#[test]
fn test_file_sinks_become_threaded_sinks() {
    let config = parse(
        r#"
        [sinks.session_log]
        type = "line_file"

        [sinks.gaze_csv]
        type = "tabular_file"
        batching = 64
        "#,
    );

    let pipeline = from_config(&config, None).unwrap().build();
    assert_eq!(pipeline.sinks().len(), 2);
    assert!(pipeline.async_sinks().is_empty());
    assert!(pipeline.sink("session_log").is_some());
    assert!(pipeline.sink("gaze_csv").is_some());
}

#[test]
fn test_http_sink_becomes_async_sink() {
    let config = parse(
        r#"
        [sinks.collector]
        type = "http"
        endpoint = "https://collector.example/statements"
        api_key = "key"
        "#,
    );

    let pipeline = from_config(&config, None).unwrap().build();
    assert!(pipeline.sinks().is_empty());
    assert!(pipeline.async_sink("collector").is_some());
}

#[test]
fn test_http_endpoint_from_resolved_credentials() {
    let config = parse(
        r#"
        [sinks.collector]
        type = "http"
        "#,
    );
    let credentials = Credentials {
        endpoint: "https://resolved.example".to_string(),
        key: "resolved-key".to_string(),
    };

    assert!(from_config(&config, Some(&credentials)).is_ok());
}

#[test]
fn test_http_without_endpoint_is_rejected() {
    let config = parse(
        r#"
        [sinks.collector]
        type = "http"
        "#,
    );

    let err = from_config(&config, None).unwrap_err();
    assert!(matches!(err, ConfigError::Sink { name, .. } if name == "collector"));
}

#[test]
fn test_disabled_sink_is_constructed_but_skipped() {
    let config = parse(
        r#"
        [sinks.off]
        type = "line_file"
        enabled = false
        "#,
    );

    let pipeline = from_config(&config, None).unwrap().build();
    let sink = pipeline.sink("off").unwrap();
    assert!(!sink.enabled());

    pipeline.submit(beacon_statement::Statement::new("test"));
    assert_eq!(sink.queue_len(), 0);
}

#[test]
fn test_unbatched_tabular_sink_flushes_during_session() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = parse(&format!(
        r#"
        [sinks.rows]
        type = "tabular_file"
        directory = "{}"
        identifier = "session"
        "#,
        dir.path().display()
    ));

    let pipeline = from_config(&config, None).unwrap().build();
    pipeline.start_sending();
    let mut statement = beacon_statement::Statement::new("test");
    statement.set_field("a", serde_json::json!(1));
    pipeline.submit(statement);

    let sink = pipeline.sink("rows").unwrap();
    assert!(wait_until(
        || sink.metrics().statements_sent == 1,
        Duration::from_secs(2)
    ));
    pipeline.stop_sending();

    // Rows reached the data temp file without waiting for close.
    let rows = std::fs::read_to_string(dir.path().join("session.csv.rows")).unwrap();
    assert_eq!(rows.lines().count(), 1);
}

#[test]
fn test_batching_carries_into_sink_config() {
    let config = parse(
        r#"
        [sinks.batched]
        type = "line_file"
        batching = 16
        "#,
    );

    // DeliveryMode is internal to the sink; verify via the spec conversion.
    let spec = config.sinks.get("batched").unwrap();
    assert_eq!(
        spec.common().sink_config("batched").mode,
        DeliveryMode::Batch {
            max_batch_size: Some(16)
        }
    );
}
