//! Tabular format - dynamic schema row/column builder
//!
//! Headers grow as new fields are observed; rows are fixed-width arrays
//! aligned to the header list as it stood when they were appended. Older
//! rows are never mutated - serialization iterates the *current* header
//! list and back-fills missing cells, so every emitted row has exactly
//! `headers.len()` fields regardless of when it was appended.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::csv;
use crate::flatten::flatten_fields;
use crate::{ColumnFilter, FormatError};

#[cfg(test)]
#[path = "tabular_test.rs"]
mod tabular_test;

/// Dynamic-schema table of rows keyed by a growing header list
///
/// Header order is first-seen order and names are unique. The name→index
/// cache is rebuilt whenever the header count changes.
#[derive(Debug, Default)]
pub struct TabularFormat {
    /// Header names, first-seen order
    headers: Vec<String>,

    /// Header name → column index cache
    index: HashMap<String, usize>,

    /// Rows, each aligned to the header list at append time
    rows: Vec<Vec<Option<String>>>,

    /// Include/exclude filter over header names
    filter: ColumnFilter,

    /// Whether nested payload JSON is flattened into dotted keys
    flatten: bool,
}

impl TabularFormat {
    /// Create an empty format admitting every column
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the include/exclude filter
    #[must_use]
    pub fn with_filter(mut self, filter: ColumnFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Enable flattening of nested JSON into dotted keys
    #[must_use]
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Current header names, first-seen order
    #[inline]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of buffered rows
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are buffered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one row from a field map
    ///
    /// New field names passing the filter are appended to the header list;
    /// the row itself is built by iterating the current headers and looking
    /// each name up in the fields (missing → empty cell). Fields whose name
    /// fails the filter never create a header, so they are invisible unless
    /// an earlier row already admitted the column.
    pub fn append_row(&mut self, fields: &Map<String, Value>) {
        let flattened;
        let fields = if self.flatten {
            flattened = flatten_fields(fields);
            &flattened
        } else {
            fields
        };

        let before = self.headers.len();
        for key in fields.keys() {
            if !self.index.contains_key(key) && self.filter.allows(key) {
                self.headers.push(key.clone());
                self.index.insert(key.clone(), self.headers.len() - 1);
            }
        }
        if self.headers.len() != before {
            self.rebuild_index();
        }

        let row = self
            .headers
            .iter()
            .map(|header| fields.get(header).map(csv::render_value))
            .collect();
        self.rows.push(row);
    }

    /// Merge another format into this one
    ///
    /// The header set becomes the union (this format's order first, then
    /// the other's new headers in their order); rows of both formats are
    /// remapped into the unioned layout and concatenated.
    pub fn merge(&mut self, other: TabularFormat) {
        for header in &other.headers {
            if !self.index.contains_key(header) {
                self.headers.push(header.clone());
                self.index.insert(header.clone(), self.headers.len() - 1);
            }
        }
        self.rebuild_index();

        // This format's headers are a prefix of the union, so its rows only
        // need widening; the other's rows are remapped column by column.
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, None);
        }
        for other_row in other.rows {
            let mut row = vec![None; width];
            for (j, cell) in other_row.into_iter().enumerate() {
                if let Some(header) = other.headers.get(j) {
                    if let Some(&idx) = self.index.get(header) {
                        row[idx] = cell;
                    }
                }
            }
            self.rows.push(row);
        }
    }

    /// Rename a header in place
    pub fn rename_header(&mut self, old: &str, new: &str) -> crate::Result<()> {
        if self.index.contains_key(new) {
            return Err(FormatError::DuplicateHeader(new.to_string()));
        }
        let idx = *self
            .index
            .get(old)
            .ok_or_else(|| FormatError::UnknownHeader(old.to_string()))?;
        self.headers[idx] = new.to_string();
        self.rebuild_index();
        Ok(())
    }

    /// Drop a header and its column from every row
    pub fn drop_header(&mut self, name: &str) -> crate::Result<()> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| FormatError::UnknownHeader(name.to_string()))?;
        self.headers.remove(idx);
        for row in &mut self.rows {
            if idx < row.len() {
                row.remove(idx);
            }
        }
        self.rebuild_index();
        Ok(())
    }

    /// Serialized header line using this format's own filter
    pub fn header_line(&self) -> String {
        self.header_line_with(&self.filter)
    }

    /// Serialized header line through an arbitrary filter
    ///
    /// Filtering is not baked into storage: the same format can be rendered
    /// with different column subsets.
    pub fn header_line_with(&self, filter: &ColumnFilter) -> String {
        let columns = self.visible_columns(filter);
        csv::join_row(columns.iter().map(|&i| self.headers[i].as_str()))
    }

    /// Serialize one row through the given filter, back-filled to the
    /// current header count
    fn row_line_with(&self, row: &[Option<String>], filter: &ColumnFilter) -> String {
        let columns = self.visible_columns(filter);
        csv::join_row(
            columns
                .iter()
                .map(|&i| row.get(i).and_then(|c| c.as_deref()).unwrap_or("")),
        )
    }

    /// Serialize every buffered row (one line each, no header)
    pub fn row_lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| self.row_line_with(row, &self.filter))
            .collect()
    }

    /// Serialize and clear the buffered rows, retaining the header list
    ///
    /// Used by the tabular file sink at the end of each batch cycle.
    pub fn drain_row_lines(&mut self) -> Vec<String> {
        let rows = std::mem::take(&mut self.rows);
        rows.iter()
            .map(|row| self.row_line_with(row, &self.filter))
            .collect()
    }

    /// Full CSV rendering: header line plus rows, newline-terminated
    pub fn to_csv(&self) -> String {
        self.to_csv_with(&self.filter)
    }

    /// Full CSV rendering through an arbitrary filter
    pub fn to_csv_with(&self, filter: &ColumnFilter) -> String {
        let mut out = self.header_line_with(filter);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.row_line_with(row, filter));
            out.push('\n');
        }
        out
    }

    /// Build a table from an arbitrary JSON value
    ///
    /// Arrays pivot into one row per element (scalar elements become a
    /// single `value` column); a lone object becomes a single row.
    pub fn from_json(value: &Value, flatten: bool) -> Self {
        let mut format = TabularFormat::new().with_flatten(flatten);
        match value {
            Value::Array(items) => {
                for item in items {
                    format.append_row(&as_fields(item));
                }
            }
            other => format.append_row(&as_fields(other)),
        }
        format
    }

    fn visible_columns(&self, filter: &ColumnFilter) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, name)| filter.allows(name))
            .map(|(i, _)| i)
            .collect()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, header) in self.headers.iter().enumerate() {
            self.index.insert(header.clone(), i);
        }
    }
}

/// View any JSON value as a field map (scalars get a `value` column)
fn as_fields(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        other => {
            let mut map = Map::with_capacity(1);
            map.insert("value".to_string(), other.clone());
            map
        }
    }
}
