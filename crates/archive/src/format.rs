//! Wire constants and the two fixed header records.
//!
//! Layout of a container file (all integers little-endian):
//!
//! ```text
//! offset 0    : magic        u32
//! offset 4    : file_info    record { major: u32, minor: u32, header_size: u32 }
//! offset 20   : blocks_info  record { first_height: u64, last_height_hint: u64, reserved: u64 }
//! offset 48   : zero padding up to header_size
//! offset 1024 : chunks       { length: u32, payload: [u8; length] }, back-to-back
//! ```
//!
//! A "record" is a `u32` length prefix followed by the deterministic bincode
//! encoding of the struct (see [`crate::codec`]).

use serde::{Deserialize, Serialize};

/// Magic number at offset 0 of every archive file.
pub const ARCHIVE_MAGIC: u32 = 0x2872_1586;

/// Total size of the padded header region; the first chunk starts here.
pub const HEADER_SIZE: u32 = 1024;

/// Major format version written by this crate. Readers reject anything else.
pub const MAJOR_VERSION: u32 = 1;

/// Minor format version written by this crate. Informational only.
pub const MINOR_VERSION: u32 = 0;

/// Default number of blocks per chunk.
pub const DEFAULT_CHUNK_INTERVAL: u64 = 1;

/// Soft chunk-size target in bytes; the writer warns past this.
pub const CHUNK_SIZE_WARN: u32 = 1_000_000;

/// First header record: format versioning and the size of the padded
/// header region a reader must skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Major format version; gates forward compatibility.
    pub major_version: u32,
    /// Minor format version; advisory.
    pub minor_version: u32,
    /// Size of the padded header region in bytes.
    pub header_size: u32,
}

impl FileInfo {
    /// The record this crate writes into new archives.
    pub const fn current() -> Self {
        Self { major_version: MAJOR_VERSION, minor_version: MINOR_VERSION, header_size: HEADER_SIZE }
    }
}

impl Default for FileInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Second header record: the height range the archive covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlocksInfo {
    /// Height of the first block ever written to this file. Never changes
    /// on append.
    pub first_block_height: u64,
    /// The stop height requested when the file was created. Advisory; the
    /// true extent of the file is the count of blocks actually present.
    pub last_block_height_hint: u64,
    /// Reserved for future use; always written as zero, ignored on read.
    pub reserved: u64,
}

impl BlocksInfo {
    /// Builds the record for a new archive covering `[first, last_hint]`.
    pub const fn new(first: u64, last_hint: u64) -> Self {
        Self { first_block_height: first, last_block_height_hint: last_hint, reserved: 0 }
    }
}
