use super::*;

use beacon_statement::ComposerRef;

fn policy(shard: ShardMode) -> FilePathPolicy {
    FilePathPolicy::new(BaseDir::Custom(PathBuf::from("/data")), "session", shard)
}

#[test]
fn test_custom_base_dir_resolves_verbatim() {
    assert_eq!(
        BaseDir::Custom(PathBuf::from("/var/beacon")).resolve(),
        PathBuf::from("/var/beacon")
    );
}

#[test]
fn test_session_mode_single_file() {
    let policy = policy(ShardMode::Session);
    let statement = Statement::new("test");

    assert_eq!(policy.shard_key(&statement), 0);
    assert_eq!(
        policy.shard_path(&statement, "jsonl"),
        PathBuf::from("/data/session.jsonl")
    );
}

#[test]
fn test_per_composer_mode_shards_by_composer() {
    let policy = policy(ShardMode::PerComposer);
    let gaze = ComposerRef::new("gaze");
    let head = ComposerRef::new("head");

    let from_gaze = gaze.compose("hmd", Default::default());
    let from_head = head.compose("hmd", Default::default());

    assert_ne!(policy.shard_key(&from_gaze), policy.shard_key(&from_head));
    assert_eq!(
        policy.shard_path(&from_gaze, "csv"),
        PathBuf::from("/data/session/gaze.csv")
    );
    assert_eq!(
        policy.shard_path(&from_head, "csv"),
        PathBuf::from("/data/session/head.csv")
    );
}

#[test]
fn test_composerless_statement_falls_back_to_unknown() {
    let policy = policy(ShardMode::PerComposer);
    let statement = Statement::new("test");

    assert_eq!(policy.shard_key(&statement), 0);
    assert_eq!(
        policy.shard_path(&statement, "csv"),
        PathBuf::from("/data/session/Unknown.csv")
    );
}

#[test]
fn test_identifier_strftime_expansion() {
    let resolved = resolve_session_identifier("run-{%Y}");
    let year = Utc::now().format("%Y").to_string();
    assert_eq!(resolved, format!("run-{year}"));
}

#[test]
fn test_identifier_invalid_pattern_kept_verbatim() {
    // `%Q` is not a strftime directive; the segment survives minus braces.
    assert_eq!(resolve_session_identifier("run-{%Q}"), "run-%Q");
    assert_eq!(resolve_session_identifier("plain-name"), "plain-name");
}

#[test]
fn test_identifier_unbalanced_brace_kept() {
    assert_eq!(resolve_session_identifier("run-{%Y"), "run-{%Y");
}

#[test]
fn test_sanitize_file_name() {
    assert_eq!(sanitize_file_name("gaze/left:eye"), "gaze_left_eye");
    assert_eq!(sanitize_file_name(""), "Unknown");
    assert_eq!(sanitize_file_name("plain"), "plain");
}
