//! Error types for archive operations.

use chainpack_source::SourceError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors that may occur while writing, reading, or exporting an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The file does not start with the archive magic number.
    #[error("bad archive magic {found:#010x}")]
    Format {
        /// The magic value actually found at offset 0.
        found: u32,
    },

    /// The archive was written under a major version this reader does not
    /// understand.
    #[error("unsupported archive major version {found}")]
    Version {
        /// The major version recorded in the file.
        found: u32,
    },

    /// The archive is structurally invalid at the given byte offset.
    #[error("corrupt archive at offset {offset}: {reason}")]
    Corruption {
        /// Absolute byte offset of the first invalid structure.
        offset: u64,
        /// What went wrong there.
        reason: String,
    },

    /// The export directory could not be created.
    #[error("failed to create export directory {}", .path.display())]
    Create {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The archive file could not be opened.
    #[error("failed to open archive file {}", .path.display())]
    Open {
        /// The file that could not be opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A write, read, flush, or seek on the archive stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A record could not be serialized.
    #[error("failed to encode record: {0}")]
    Encode(#[source] bincode::Error),

    /// The block source could not produce data required at the given height.
    #[error("failed to resolve chain data at height {height}: {source}")]
    Resolution {
        /// Height the export driver was processing.
        height: u64,
        /// The adapter failure.
        #[source]
        source: SourceError,
    },

    /// A block package carries no coinbase height.
    #[error("block package has no coinbase height (expected height {expected})")]
    MissingHeight {
        /// The height the writer expected to append next.
        expected: u64,
    },

    /// A block package arrived out of height order.
    #[error("out-of-order block: expected height {expected}, found {found}")]
    OutOfOrder {
        /// The height the writer expected to append next.
        expected: u64,
        /// The height embedded in the rejected package.
        found: u64,
    },

    /// A block package's transaction set disagrees with the block's
    /// transaction-hash list.
    #[error("block at height {height} references {expected} transactions but packages {found}")]
    TxCountMismatch {
        /// Height of the offending block.
        height: u64,
        /// Number of transaction hashes in the block.
        expected: usize,
        /// Number of transactions packaged alongside it.
        found: usize,
    },
}
