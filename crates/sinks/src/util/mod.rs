//! Shared file-output utilities
//!
//! [`BufferedWriter`] wraps buffered file I/O behind a lock; the
//! [`BufferRegistry`] keys writers (plus sink-specific state) by shard so
//! per-composer output reuses one buffer per file.

mod buffered_writer;
mod registry;

pub use buffered_writer::BufferedWriter;
pub use registry::{BufferRegistry, FileBuffer};
