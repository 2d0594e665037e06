//! In-memory chunk accumulation.

use std::io::{self, Write};

/// Growable byte accumulator holding serialized block packages between
/// chunk flushes.
///
/// The buffer has no flush-threshold logic of its own; the writer decides
/// when its contents become a chunk. [`ChunkBuffer::reset`] drops the
/// contents but keeps the allocation, so a long export settles on one
/// buffer sized to its largest chunk.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    bytes: Vec<u8>,
}

impl ChunkBuffer {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Creates an empty buffer with `capacity` bytes preallocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { bytes: Vec::with_capacity(capacity) }
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The buffered bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Clears the buffer, retaining its allocation.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }
}

impl Write for ChunkBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
