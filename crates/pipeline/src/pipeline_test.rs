use super::*;

use std::sync::Arc;
use std::time::{Duration, Instant};

use beacon_sinks::{
    BaseDir, FilePathPolicy, LineFileConfig, LineFileSink, SendError, ShardMode, SinkConfig,
    Transport,
};
use parking_lot::Mutex;
use serde_json::json;

fn statement(origin: &str) -> Statement {
    Statement::new(origin)
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

struct RecordingTransport {
    sent: Arc<Mutex<Vec<Statement>>>,
}

impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&mut self, statement: &Statement) -> Result<(), SendError> {
        self.sent.lock().push(statement.clone());
        Ok(())
    }
}

fn recording_sink(id: &str) -> (Sink, Arc<Mutex<Vec<Statement>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let sink = Sink::new(
        SinkConfig::default().with_id(id),
        Box::new(RecordingTransport {
            sent: Arc::clone(&sent),
        }),
    );
    (sink, sent)
}

struct Tag;

impl Hook for Tag {
    fn apply(&self, mut statement: Statement) -> Statement {
        statement.set_field("tagged", json!(true));
        statement
    }

    fn name(&self) -> &'static str {
        "tag"
    }
}

struct DropAll;

impl Hook for DropAll {
    fn apply(&self, mut statement: Statement) -> Statement {
        statement.discard();
        statement
    }

    fn name(&self) -> &'static str {
        "drop_all"
    }
}

#[test]
fn test_fan_out_clones_to_every_enabled_sink() {
    let (first, _) = recording_sink("first");
    let (second, _) = recording_sink("second");
    let pipeline = PipelineBuilder::new().sink(first).sink(second).build();

    pipeline.submit(statement("test"));

    assert_eq!(pipeline.sink("first").unwrap().queue_len(), 1);
    assert_eq!(pipeline.sink("second").unwrap().queue_len(), 1);
    assert_eq!(
        pipeline.metrics(),
        PipelineSnapshot {
            received: 1,
            delivered: 1,
            discarded: 0
        }
    );
}

#[test]
fn test_disabled_sink_is_skipped() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let disabled = Sink::new(
        SinkConfig::default().with_id("off").disabled(),
        Box::new(RecordingTransport {
            sent: Arc::clone(&sent),
        }),
    );
    let pipeline = PipelineBuilder::new().sink(disabled).build();

    pipeline.submit(statement("test"));

    assert_eq!(pipeline.sink("off").unwrap().queue_len(), 0);
}

#[test]
fn test_hooks_run_before_fan_out() {
    let (sink, _) = recording_sink("tagged");
    let pipeline = PipelineBuilder::new().hook(Box::new(Tag)).sink(sink).build();

    pipeline.submit(statement("test"));
    pipeline.start_sending();

    let sink = pipeline.sink("tagged").unwrap();
    assert!(wait_until(
        || sink.metrics().statements_sent == 1,
        Duration::from_secs(2)
    ));
    pipeline.stop_sending();
}

#[test]
fn test_discarded_statement_reaches_no_sink() {
    let (sink, _) = recording_sink("never");
    let pipeline = PipelineBuilder::new()
        .hook(Box::new(DropAll))
        .hook(Box::new(Tag))
        .sink(sink)
        .build();

    pipeline.submit(statement("test"));

    assert_eq!(pipeline.sink("never").unwrap().queue_len(), 0);
    assert_eq!(
        pipeline.metrics(),
        PipelineSnapshot {
            received: 1,
            delivered: 0,
            discarded: 1
        }
    );
}

#[test]
fn test_lookup_by_name() {
    let (sink, _) = recording_sink("known");
    let pipeline = PipelineBuilder::new().sink(sink).build();

    assert!(pipeline.sink("known").is_some());
    assert!(pipeline.sink("unknown").is_none());
    assert_eq!(pipeline.sinks().len(), 1);
    assert!(pipeline.async_sinks().is_empty());
}

#[test]
fn test_end_to_end_delivery() {
    let (sink, sent) = recording_sink("e2e");
    let pipeline = PipelineBuilder::new().hook(Box::new(Tag)).sink(sink).build();

    pipeline.start_sending();
    for _ in 0..3 {
        pipeline.submit(statement("test"));
    }

    assert!(wait_until(|| sent.lock().len() == 3, Duration::from_secs(2)));
    pipeline.stop_sending();

    // The hook's mark survived the fan-out clone.
    assert_eq!(sent.lock()[0].field("tagged"), Some(&json!(true)));
}

#[tokio::test]
async fn test_close_drains_and_finalizes_file_sink() {
    let dir = tempfile::TempDir::new().unwrap();
    let policy = FilePathPolicy::new(
        BaseDir::Custom(dir.path().to_path_buf()),
        "session",
        ShardMode::Session,
    );
    let sink = Sink::new(
        SinkConfig::default().with_id("file"),
        Box::new(LineFileSink::new(LineFileConfig::new(policy))),
    );
    let pipeline = PipelineBuilder::new().sink(sink).build();

    pipeline.start_sending();
    pipeline.submit(statement("test"));

    let sink = pipeline.sink("file").unwrap();
    assert!(wait_until(
        || sink.metrics().statements_sent == 1,
        Duration::from_secs(2)
    ));
    pipeline.close().await;

    let content = std::fs::read_to_string(dir.path().join("session.jsonl")).unwrap();
    assert_eq!(content.lines().count(), 1);
}
