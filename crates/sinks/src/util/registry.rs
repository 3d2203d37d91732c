//! Shard-keyed buffer registry

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use super::BufferedWriter;

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

/// A writer plus sink-specific per-file state
///
/// Tabular sinks keep their in-memory table and flush bookkeeping in `A`;
/// line sinks use `()`.
#[derive(Debug)]
pub struct FileBuffer<A> {
    writer: BufferedWriter,
    aux: Mutex<A>,
}

impl<A> FileBuffer<A> {
    /// Pair a writer with its per-file state
    pub fn new(writer: BufferedWriter, aux: A) -> Self {
        Self {
            writer,
            aux: Mutex::new(aux),
        }
    }

    /// The underlying writer
    pub fn writer(&self) -> &BufferedWriter {
        &self.writer
    }

    /// Run `f` with exclusive access to the per-file state
    pub fn with_aux<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(&mut self.aux.lock())
    }
}

/// Buffers keyed by shard
///
/// `ensure` opens a buffer on first use of a key and reuses it afterwards,
/// so each output file has exactly one writer regardless of how many
/// statements route to it.
#[derive(Debug, Default)]
pub struct BufferRegistry<A> {
    buffers: Mutex<HashMap<u64, Arc<FileBuffer<A>>>>,
}

impl<A> BufferRegistry<A> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            buffers: Mutex::new(HashMap::new()),
        }
    }

    /// Get the buffer for `key`, creating it with `factory` on first use
    pub fn ensure(
        &self,
        key: u64,
        factory: impl FnOnce() -> io::Result<FileBuffer<A>>,
    ) -> io::Result<Arc<FileBuffer<A>>> {
        let mut buffers = self.buffers.lock();
        if let Some(buffer) = buffers.get(&key) {
            return Ok(Arc::clone(buffer));
        }
        let buffer = Arc::new(factory()?);
        buffers.insert(key, Arc::clone(&buffer));
        Ok(buffer)
    }

    /// Look up an existing buffer
    pub fn get(&self, key: u64) -> Option<Arc<FileBuffer<A>>> {
        self.buffers.lock().get(&key).map(Arc::clone)
    }

    /// Number of open buffers
    pub fn len(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Whether no buffers are open
    pub fn is_empty(&self) -> bool {
        self.buffers.lock().is_empty()
    }

    /// All open buffers
    pub fn snapshot(&self) -> Vec<Arc<FileBuffer<A>>> {
        self.buffers.lock().values().map(Arc::clone).collect()
    }

    /// Flush every open buffer
    pub fn flush_all(&self) -> io::Result<()> {
        for buffer in self.snapshot() {
            buffer.writer().flush()?;
        }
        Ok(())
    }

    /// Close every buffer, running `on_dispose` on each
    ///
    /// Buffers are drained under the lock and processed outside it. The
    /// first error aborts; remaining buffers are still dropped.
    pub fn dispose_all(
        &self,
        mut on_dispose: impl FnMut(Arc<FileBuffer<A>>) -> io::Result<()>,
    ) -> io::Result<()> {
        let drained: Vec<_> = {
            let mut buffers = self.buffers.lock();
            buffers.drain().map(|(_, buffer)| buffer).collect()
        };
        for buffer in drained {
            on_dispose(buffer)?;
        }
        Ok(())
    }
}
