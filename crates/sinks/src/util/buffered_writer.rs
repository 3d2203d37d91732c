//! Locked buffered file writer

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

#[cfg(test)]
#[path = "buffered_writer_test.rs"]
mod buffered_writer_test;

/// Buffered writer over a file, shareable across threads
///
/// Parent directories are created on open. Writes are buffered; callers
/// flush at their own checkpoints (after a batch, on close).
#[derive(Debug)]
pub struct BufferedWriter {
    path: PathBuf,
    inner: Mutex<BufWriter<File>>,
}

impl BufferedWriter {
    /// Open for appending, creating the file and its directories as needed
    pub fn append(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        Self::create_parent(&path)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            inner: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    /// Open for rewriting, truncating any existing content
    ///
    /// Unlike [`append`], the file is opened in plain write mode so it can
    /// be truncated and rewritten in place (append mode pins every write to
    /// the end of the file regardless of seeks).
    ///
    /// [`append`]: Self::append
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        Self::create_parent(&path)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self {
            inner: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    fn create_parent(path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// The file this writer targets
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a string fragment without a newline
    pub fn write_str(&self, s: &str) -> io::Result<()> {
        self.inner.lock().write_all(s.as_bytes())
    }

    /// Write a string followed by a newline
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut inner = self.inner.lock();
        inner.write_all(line.as_bytes())?;
        inner.write_all(b"\n")
    }

    /// Flush buffered bytes to the OS
    pub fn flush(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }

    /// Truncate the file to zero length and rewind to the start
    ///
    /// Only meaningful for writers opened with [`create`]; used to rewrite
    /// a header file in place when the schema grows.
    ///
    /// [`create`]: Self::create
    pub fn rewind_truncate(&self) -> io::Result<()> {
        let mut inner = self.inner.lock();
        inner.flush()?;
        inner.get_mut().set_len(0)?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}
