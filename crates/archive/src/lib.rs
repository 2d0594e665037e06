//! Portable block-archive container format.
//!
//! A container file holds a contiguous, gap-free range of blocks (with
//! their full transaction sets) in one portable file: a fixed 1024-byte
//! header followed by length-prefixed chunks of serialized block packages.
//! The [`ArchiveWriter`] appends chunks across any number of process
//! invocations, the [`ArchiveReader`] validates and lazily walks them, and
//! the [`Exporter`] drives a height range out of a
//! [`chainpack_source::BlockSource`].

mod buffer;
mod codec;
mod error;
mod export;
mod format;
mod reader;
mod writer;

pub use buffer::ChunkBuffer;
pub use error::ArchiveError;
pub use export::{ExportOptions, ExportSummary, Exporter};
pub use format::{
    ARCHIVE_MAGIC, BlocksInfo, CHUNK_SIZE_WARN, DEFAULT_CHUNK_INTERVAL, FileInfo, HEADER_SIZE,
    MAJOR_VERSION, MINOR_VERSION,
};
pub use reader::{ArchiveReader, BlockStream, ScanSummary};
pub use writer::ArchiveWriter;
