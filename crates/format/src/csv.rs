//! RFC4180-style CSV helpers
//!
//! Fields containing a comma, quote, or newline are wrapped in quotes with
//! internal quotes doubled. `field_count` and `pad_line` operate on already
//! serialized lines and respect that quoting, which the tabular file sink
//! relies on when reconciling data written before the schema finished
//! growing.

use std::borrow::Cow;

use serde_json::Value;

#[cfg(test)]
#[path = "csv_test.rs"]
mod csv_test;

/// Escape one field per RFC4180
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        let mut escaped = String::with_capacity(field.len() + 2);
        escaped.push('"');
        for ch in field.chars() {
            if ch == '"' {
                escaped.push('"');
            }
            escaped.push(ch);
        }
        escaped.push('"');
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(field)
    }
}

/// Join escaped fields into one CSV line (no trailing newline)
pub fn join_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_field(field));
    }
    line
}

/// Count the fields of a serialized CSV line, honoring quoting
pub fn field_count(line: &str) -> usize {
    let mut count = 1;
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => count += 1,
            _ => {}
        }
    }
    count
}

/// Whether a serialized fragment ends inside an unclosed quoted field
///
/// Quoted cells may contain literal newlines, so a physical line read from
/// a file is not necessarily a complete record. Internal quotes are
/// doubled, so quote parity decides.
pub fn open_quoted(fragment: &str) -> bool {
    fragment.bytes().filter(|&b| b == b'"').count() % 2 == 1
}

/// Pad a serialized line with empty trailing fields up to `columns`
///
/// Lines already at or beyond the target width are returned unchanged.
pub fn pad_line(line: &str, columns: usize) -> Cow<'_, str> {
    let have = field_count(line);
    if have >= columns {
        return Cow::Borrowed(line);
    }
    let mut padded = String::with_capacity(line.len() + (columns - have));
    padded.push_str(line);
    for _ in have..columns {
        padded.push(',');
    }
    Cow::Owned(padded)
}

/// Render a JSON value as CSV cell text
///
/// Strings are used verbatim (escaping happens at line assembly), null
/// becomes the empty cell, and everything else keeps its JSON rendering.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
