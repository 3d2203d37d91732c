//! Line-delimited file transport
//!
//! Writes one JSON record per line, one file per shard. The file is
//! append-only and complete at every line boundary, so a crash loses at
//! most the buffered tail.

use std::io;

use beacon_statement::Statement;

use crate::util::{BufferRegistry, BufferedWriter, FileBuffer};
use crate::{FilePathPolicy, SendError, Transport};

#[cfg(test)]
#[path = "line_file_test.rs"]
mod line_file_test;

/// Line-delimited file sink configuration
#[derive(Debug, Clone)]
pub struct LineFileConfig {
    /// Where shard files land
    pub policy: FilePathPolicy,

    /// File extension without the dot
    pub extension: String,
}

impl LineFileConfig {
    /// Configure with the default `jsonl` extension
    pub fn new(policy: FilePathPolicy) -> Self {
        Self {
            policy,
            extension: "jsonl".to_string(),
        }
    }

    /// Override the file extension
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Statement transport writing line-delimited JSON files
pub struct LineFileSink {
    config: LineFileConfig,
    buffers: BufferRegistry<()>,
}

impl LineFileSink {
    /// Create a sink; files open lazily on first statement per shard
    pub fn new(config: LineFileConfig) -> Self {
        Self {
            config,
            buffers: BufferRegistry::new(),
        }
    }

    fn buffer_for(&self, statement: &Statement) -> io::Result<std::sync::Arc<FileBuffer<()>>> {
        let key = self.config.policy.shard_key(statement);
        self.buffers.ensure(key, || {
            let path = self.config.policy.shard_path(statement, &self.config.extension);
            tracing::debug!(path = %path.display(), "opening line file");
            Ok(FileBuffer::new(BufferedWriter::append(path)?, ()))
        })
    }
}

impl Transport for LineFileSink {
    fn name(&self) -> &str {
        "line_file"
    }

    fn send(&mut self, statement: &Statement) -> Result<(), SendError> {
        let buffer = self.buffer_for(statement)?;
        buffer.writer().write_line(&statement.to_line()?)?;
        // Flush per line: the file is valid at every record boundary.
        buffer.writer().flush()?;
        Ok(())
    }

    fn after_batch(&mut self) -> Result<(), SendError> {
        self.buffers.flush_all()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SendError> {
        self.buffers.dispose_all(|buffer| buffer.writer().flush())?;
        Ok(())
    }
}
