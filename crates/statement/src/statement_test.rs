use super::*;
use serde_json::json;

fn payload(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// =============================================================================
// Construction and payload access
// =============================================================================

#[test]
fn test_new_statement_is_empty_and_live() {
    let statement = Statement::new("gaze");

    assert_eq!(statement.origin(), "gaze");
    assert!(statement.payload().is_empty());
    assert!(!statement.discarded());
    assert!(statement.composer().is_none());
    assert!(statement.owner().is_none());
}

#[test]
fn test_set_and_get_field() {
    let mut statement = Statement::new("input");
    statement.set_field("button", json!("trigger"));
    statement.set_field("pressed", json!(true));

    assert_eq!(statement.field("button"), Some(&json!("trigger")));
    assert_eq!(statement.field("pressed"), Some(&json!(true)));
    assert_eq!(statement.field("missing"), None);
}

#[test]
fn test_set_field_replaces_value() {
    let mut statement = Statement::new("input");
    statement.set_field("count", json!(1));
    statement.set_field("count", json!(2));

    assert_eq!(statement.field("count"), Some(&json!(2)));
}

// =============================================================================
// Provenance invariants
// =============================================================================

#[test]
fn test_composer_assigned_exactly_once() {
    let mut statement = Statement::new("gaze");
    let first = ComposerRef::new("gaze_composer");
    let second = ComposerRef::new("other");

    statement.set_composer(first.clone()).expect("first set");
    let err = statement.set_composer(second).unwrap_err();

    assert!(matches!(
        err,
        StatementError::ProvenanceReassigned { field: "composer" }
    ));
    assert_eq!(statement.composer().unwrap().id(), first.id());
}

#[test]
fn test_owner_assigned_exactly_once() {
    let mut statement = Statement::new("gaze");
    statement.set_owner("tracker_a").expect("first set");

    let err = statement.set_owner("tracker_b").unwrap_err();
    assert!(matches!(
        err,
        StatementError::ProvenanceReassigned { field: "owner" }
    ));
    assert_eq!(statement.owner(), Some("tracker_a"));
}

#[test]
fn test_discard_is_monotonic() {
    let mut statement = Statement::new("gaze");
    assert!(!statement.discarded());

    statement.discard();
    statement.discard();
    assert!(statement.discarded());
}

// =============================================================================
// Clone independence
// =============================================================================

#[test]
fn test_clone_is_value_independent() {
    let mut original = Statement::new("gaze");
    original.set_field("x", json!(1.0));

    let mut copy = original.clone();
    copy.set_field("x", json!(9.0));
    copy.discard();

    assert_eq!(original.field("x"), Some(&json!(1.0)));
    assert!(!original.discarded());
    assert!(copy.discarded());
}

// =============================================================================
// Line round trip
// =============================================================================

#[test]
fn test_line_round_trip_preserves_fields() {
    let mut statement = Statement::with_payload(
        "head",
        payload(&[
            ("yaw", json!(12.5)),
            ("pitch", json!(-3.0)),
            ("target", json!("door_01")),
        ]),
    );
    statement.set_owner("tracker").unwrap();

    let line = statement.to_line().expect("serialize");
    assert!(!line.contains('\n'), "line must be single-line");

    let parsed = Statement::from_line(&line).expect("parse");
    assert_eq!(parsed.origin(), statement.origin());
    assert_eq!(parsed.timestamp(), statement.timestamp());
    assert_eq!(parsed.payload(), statement.payload());
}

#[test]
fn test_from_line_rejects_garbage() {
    assert!(Statement::from_line("not json").is_err());
    assert!(Statement::from_line("[1,2,3]").is_err());
}

// =============================================================================
// Row fields
// =============================================================================

#[test]
fn test_row_fields_envelope_leads() {
    let statement =
        Statement::with_payload("gaze", payload(&[("a", json!(1)), ("b", json!("two"))]));

    let fields = statement.row_fields();
    let keys: Vec<&String> = fields.keys().collect();

    assert_eq!(keys[0], "timestamp");
    assert_eq!(keys[1], "origin");
    assert_eq!(keys[2], "a");
    assert_eq!(keys[3], "b");
    assert_eq!(fields["origin"], json!("gaze"));
}
