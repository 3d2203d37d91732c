//! Tabular (CSV) file transport
//!
//! The CSV schema grows as statements introduce new fields, but a header
//! cannot be rewritten inside an append-only file. Each shard therefore
//! writes two temp files during the session: a header file rewritten in
//! place whenever the schema grows, and an append-only data file of rows.
//! On close the two merge into the final `.csv`, padding rows that were
//! flushed before the schema finished growing so every data row carries
//! the final column count.
//!
//! Rows buffer in memory between flushes; drive this transport in batch
//! mode so `after_batch` checkpoints reach disk regularly.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use beacon_format::{csv, ColumnFilter, TabularFormat};
use beacon_statement::Statement;

use crate::util::{BufferRegistry, BufferedWriter, FileBuffer};
use crate::{FilePathPolicy, SendError, Transport};

#[cfg(test)]
#[path = "tabular_file_test.rs"]
mod tabular_file_test;

/// Tabular file sink configuration
#[derive(Debug, Clone)]
pub struct TabularFileConfig {
    /// Where shard files land
    pub policy: FilePathPolicy,

    /// Include/exclude filter over column names
    pub filter: ColumnFilter,

    /// Whether nested payload JSON flattens into dotted columns
    pub flatten: bool,
}

impl TabularFileConfig {
    /// Configure with an open filter and flattening enabled
    pub fn new(policy: FilePathPolicy) -> Self {
        Self {
            policy,
            filter: ColumnFilter::allow_all(),
            flatten: true,
        }
    }

    /// Set the column filter
    #[must_use]
    pub fn with_filter(mut self, filter: ColumnFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Enable or disable payload flattening
    #[must_use]
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }
}

/// Per-shard tabular state
struct TabularState {
    /// In-memory rows not yet flushed, plus the growing header list
    table: TabularFormat,

    /// Header temp file, rewritten in place on schema growth
    header_writer: BufferedWriter,

    /// Headers already written to the header file
    headers_flushed: usize,

    /// Rows already appended to the data file
    rows_flushed: u64,

    /// Final `.csv` path produced by the close-time merge
    final_path: PathBuf,
}

/// Statement transport writing schema-merging CSV files
pub struct TabularFileSink {
    config: TabularFileConfig,
    buffers: BufferRegistry<TabularState>,
}

impl TabularFileSink {
    /// Create a sink; files open lazily on first statement per shard
    pub fn new(config: TabularFileConfig) -> Self {
        Self {
            config,
            buffers: BufferRegistry::new(),
        }
    }

    fn buffer_for(&self, statement: &Statement) -> io::Result<Arc<FileBuffer<TabularState>>> {
        let key = self.config.policy.shard_key(statement);
        self.buffers.ensure(key, || {
            let final_path = self.config.policy.shard_path(statement, "csv");
            let header_path = final_path.with_extension("csv.header");
            let data_path = final_path.with_extension("csv.rows");
            tracing::debug!(path = %final_path.display(), "opening tabular file");

            let state = TabularState {
                table: TabularFormat::new()
                    .with_filter(self.config.filter.clone())
                    .with_flatten(self.config.flatten),
                header_writer: BufferedWriter::create(header_path)?,
                headers_flushed: 0,
                rows_flushed: 0,
                final_path,
            };
            Ok(FileBuffer::new(BufferedWriter::append(data_path)?, state))
        })
    }

    /// Flush in-memory rows to the data file, rewriting the header first
    /// when the schema grew since the last flush
    fn flush_buffer(buffer: &FileBuffer<TabularState>) -> io::Result<()> {
        buffer.with_aux(|state| {
            let header_count = state.table.headers().len();
            if header_count > state.headers_flushed {
                state.header_writer.rewind_truncate()?;
                state.header_writer.write_line(&state.table.header_line())?;
                state.header_writer.flush()?;
                state.headers_flushed = header_count;
            }

            let lines = state.table.drain_row_lines();
            for line in &lines {
                buffer.writer().write_line(line)?;
            }
            state.rows_flushed += lines.len() as u64;
            buffer.writer().flush()
        })
    }

    /// Merge the header and data temp files into the final `.csv`
    ///
    /// Rows written before the schema finished growing are shorter than the
    /// final header; they get padded with empty trailing cells. A shard
    /// that never flushed a row produces no final file at all.
    fn merge(buffer: &FileBuffer<TabularState>) -> io::Result<()> {
        Self::flush_buffer(buffer)?;
        buffer.with_aux(|state| {
            let header_path = state.header_writer.path().to_path_buf();
            let data_path = buffer.writer().path().to_path_buf();

            if state.rows_flushed == 0 {
                remove_quietly(&header_path)?;
                remove_quietly(&data_path)?;
                return Ok(());
            }

            let header_content = fs::read_to_string(&header_path)?;
            let header_line = header_content.lines().next().unwrap_or("");
            let columns = csv::field_count(header_line);

            let out = BufferedWriter::create(&state.final_path)?;
            out.write_line(header_line)?;
            // Quoted cells may contain newlines, so physical lines are
            // accumulated into logical records before padding.
            let data = BufReader::new(fs::File::open(&data_path)?);
            let mut record = String::new();
            for line in data.lines() {
                let line = line?;
                if !record.is_empty() {
                    record.push('\n');
                }
                record.push_str(&line);
                if csv::open_quoted(&record) {
                    continue;
                }
                out.write_line(&csv::pad_line(&record, columns))?;
                record.clear();
            }
            if !record.is_empty() {
                out.write_line(&csv::pad_line(&record, columns))?;
            }
            out.flush()?;
            tracing::debug!(path = %state.final_path.display(), "tabular file finalized");

            remove_quietly(&header_path)?;
            remove_quietly(&data_path)
        })
    }
}

impl Transport for TabularFileSink {
    fn name(&self) -> &str {
        "tabular_file"
    }

    fn send(&mut self, statement: &Statement) -> Result<(), SendError> {
        let buffer = self.buffer_for(statement)?;
        buffer.with_aux(|state| state.table.append_row(&statement.row_fields()));
        Ok(())
    }

    fn after_batch(&mut self) -> Result<(), SendError> {
        for buffer in self.buffers.snapshot() {
            Self::flush_buffer(&buffer)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SendError> {
        self.buffers.dispose_all(|buffer| Self::merge(&buffer))?;
        Ok(())
    }
}

fn remove_quietly(path: &std::path::Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
