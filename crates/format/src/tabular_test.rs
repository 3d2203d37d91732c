use super::*;
use serde_json::json;

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

// =============================================================================
// Header growth and row alignment
// =============================================================================

#[test]
fn test_headers_grow_in_first_seen_order() {
    let mut format = TabularFormat::new();
    format.append_row(&fields(json!({"a": 1})));
    format.append_row(&fields(json!({"a": 2, "b": 3})));
    format.append_row(&fields(json!({"a": 4})));

    assert_eq!(format.headers(), ["a", "b"]);
    assert_eq!(format.row_lines(), vec!["1,", "2,3", "4,"]);
}

#[test]
fn test_header_set_monotonically_non_decreasing() {
    let mut format = TabularFormat::new();
    let mut last = 0;
    for row in [
        json!({"x": 1}),
        json!({"y": 2}),
        json!({"x": 3}),
        json!({"x": 1, "y": 2, "z": 3}),
        json!({}),
    ] {
        format.append_row(&fields(row));
        assert!(format.headers().len() >= last);
        last = format.headers().len();
    }
    assert_eq!(format.headers(), ["x", "y", "z"]);
}

#[test]
fn test_every_rendered_row_has_current_width() {
    let mut format = TabularFormat::new();
    format.append_row(&fields(json!({"a": 1})));
    format.append_row(&fields(json!({"a": 2, "b": 2, "c": 2})));

    for line in format.row_lines() {
        assert_eq!(crate::csv::field_count(&line), format.headers().len());
    }
}

#[test]
fn test_duplicate_keys_keep_one_header() {
    let mut format = TabularFormat::new();
    format.append_row(&fields(json!({"a": 1})));
    format.append_row(&fields(json!({"a": 2})));

    assert_eq!(format.headers(), ["a"]);
    assert_eq!(format.row_count(), 2);
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_filter_blocks_new_headers_at_append() {
    let filter = ColumnFilter::new(None, Some("^secret")).unwrap();
    let mut format = TabularFormat::new().with_filter(filter);
    format.append_row(&fields(json!({"a": 1, "secret_token": "x"})));

    assert_eq!(format.headers(), ["a"]);
    assert_eq!(format.row_lines(), vec!["1"]);
}

#[test]
fn test_serialization_refilters_without_rebuilding() {
    let mut format = TabularFormat::new();
    format.append_row(&fields(json!({"a": 1, "b": 2, "c": 3})));

    // Same stored data, two different renderings.
    let only_a = ColumnFilter::new(Some("^a$"), None).unwrap();
    assert_eq!(format.to_csv_with(&only_a), "a\n1\n");

    let drop_b = ColumnFilter::new(None, Some("^b$")).unwrap();
    assert_eq!(format.to_csv_with(&drop_b), "a,c\n1,3\n");

    assert_eq!(format.to_csv(), "a,b,c\n1,2,3\n");
}

// =============================================================================
// Flatten
// =============================================================================

#[test]
fn test_flatten_option_expands_nested_payload() {
    let mut format = TabularFormat::new().with_flatten(true);
    format.append_row(&fields(json!({"pos": {"x": 1, "y": 2}, "name": "n"})));

    assert_eq!(format.headers(), ["pos.x", "pos.y", "name"]);
    assert_eq!(format.row_lines(), vec!["1,2,n"]);
}

// =============================================================================
// Merge
// =============================================================================

#[test]
fn test_merge_unions_headers_and_concatenates_rows() {
    let mut left = TabularFormat::new();
    left.append_row(&fields(json!({"a": 1, "b": 2})));

    let mut right = TabularFormat::new();
    right.append_row(&fields(json!({"b": 8, "c": 9})));
    right.append_row(&fields(json!({"c": 7})));

    left.merge(right);

    assert_eq!(left.headers(), ["a", "b", "c"]);
    assert_eq!(left.row_count(), 3);
    assert_eq!(left.row_lines(), vec!["1,2,", ",8,9", ",,7"]);
}

#[test]
fn test_merge_empty_into_populated() {
    let mut left = TabularFormat::new();
    left.append_row(&fields(json!({"a": 1})));
    left.merge(TabularFormat::new());

    assert_eq!(left.headers(), ["a"]);
    assert_eq!(left.row_count(), 1);
}

// =============================================================================
// Structural edits
// =============================================================================

#[test]
fn test_rename_header() {
    let mut format = TabularFormat::new();
    format.append_row(&fields(json!({"old": 1})));

    format.rename_header("old", "new").unwrap();
    assert_eq!(format.headers(), ["new"]);
    assert_eq!(format.to_csv(), "new\n1\n");

    assert!(matches!(
        format.rename_header("missing", "x"),
        Err(FormatError::UnknownHeader(_))
    ));
    assert!(matches!(
        format.rename_header("new", "new"),
        Err(FormatError::DuplicateHeader(_))
    ));
}

#[test]
fn test_drop_header_removes_column_from_rows() {
    let mut format = TabularFormat::new();
    format.append_row(&fields(json!({"a": 1, "b": 2, "c": 3})));
    format.append_row(&fields(json!({"a": 4})));

    format.drop_header("b").unwrap();

    assert_eq!(format.headers(), ["a", "c"]);
    assert_eq!(format.row_lines(), vec!["1,3", "4,"]);
}

// =============================================================================
// Escaping
// =============================================================================

#[test]
fn test_cells_and_headers_are_escaped() {
    let mut format = TabularFormat::new();
    format.append_row(&fields(json!({"label,x": "a \"quoted\" value"})));

    assert_eq!(format.header_line(), "\"label,x\"");
    assert_eq!(format.row_lines(), vec!["\"a \"\"quoted\"\" value\""]);
}

// =============================================================================
// Drain
// =============================================================================

#[test]
fn test_drain_clears_rows_keeps_headers() {
    let mut format = TabularFormat::new();
    format.append_row(&fields(json!({"a": 1})));
    format.append_row(&fields(json!({"a": 2, "b": 3})));

    let lines = format.drain_row_lines();
    assert_eq!(lines, vec!["1,", "2,3"]);
    assert!(format.is_empty());
    assert_eq!(format.headers(), ["a", "b"]);

    // Later rows keep the grown schema.
    format.append_row(&fields(json!({"b": 5})));
    assert_eq!(format.drain_row_lines(), vec![",5"]);
}

// =============================================================================
// JSON conversion
// =============================================================================

#[test]
fn test_from_json_array_pivots_rows() {
    let value = json!([{"a": 1}, {"a": 2, "b": 3}]);
    let format = TabularFormat::from_json(&value, false);

    assert_eq!(format.headers(), ["a", "b"]);
    assert_eq!(format.row_count(), 2);
}

#[test]
fn test_from_json_scalar_array_gets_value_column() {
    let format = TabularFormat::from_json(&json!([1, 2, 3]), false);
    assert_eq!(format.headers(), ["value"]);
    assert_eq!(format.row_lines(), vec!["1", "2", "3"]);
}

#[test]
fn test_from_json_object_single_row() {
    let format = TabularFormat::from_json(&json!({"k": "v"}), false);
    assert_eq!(format.to_csv(), "k\nv\n");
}

#[test]
fn test_from_json_flatten() {
    let format = TabularFormat::from_json(&json!([{"p": {"x": 1}}]), true);
    assert_eq!(format.headers(), ["p.x"]);
}
