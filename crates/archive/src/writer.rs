//! Appending blocks to a container file.

use crate::{
    buffer::ChunkBuffer,
    codec,
    error::ArchiveError,
    format::{ARCHIVE_MAGIC, BlocksInfo, CHUNK_SIZE_WARN, DEFAULT_CHUNK_INTERVAL, FileInfo, HEADER_SIZE},
    reader::ArchiveReader,
};
use chainpack_types::BlockPackage;
use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Seek, SeekFrom, Write},
    path::Path,
};
use tracing::{debug, warn};

/// Append-only writer for a container file.
///
/// One writer owns the destination file for the duration of a run. Blocks
/// accumulate in an in-memory [`ChunkBuffer`] and hit the disk as
/// length-prefixed chunks, either when the chunking interval is reached or
/// on the unconditional final flush in [`ArchiveWriter::finish`].
#[derive(Debug)]
pub struct ArchiveWriter {
    file: BufWriter<File>,
    buffer: ChunkBuffer,
    chunk_interval: u64,
    buffered_blocks: u64,
    first_height: u64,
    next_height: u64,
    blocks_written: u64,
    max_chunk: u32,
}

impl ArchiveWriter {
    /// Opens `path` for appending, creating it (and its parent directory)
    /// if absent.
    ///
    /// A new file gets a header with `first_block_height =
    /// requested_first_height` and `last_block_height_hint =
    /// requested_last_height`. An existing file is structurally scanned
    /// first and the writer resumes at `first_block_height +
    /// blocks_present` — query it with [`ArchiveWriter::next_height`].
    /// A truncated tail chunk left by an interrupted export is dropped
    /// before appending resumes.
    pub fn open_for_append(
        path: &Path,
        requested_first_height: u64,
        requested_last_height: u64,
    ) -> Result<Self, ArchiveError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .map_err(|source| ArchiveError::Create { path: dir.to_path_buf(), source })?;
            }
        }

        if path.exists() {
            Self::open_existing(path)
        } else {
            Self::create_new(path, requested_first_height, requested_last_height)
        }
    }

    fn open_existing(path: &Path) -> Result<Self, ArchiveError> {
        let scan = ArchiveReader::count_blocks(path)?;
        let mut file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| ArchiveError::Open { path: path.to_path_buf(), source })?;

        let file_len = file.metadata()?.len();
        if file_len > scan.end_offset {
            warn!(
                target: "chainpack_archive",
                dropped = file_len - scan.end_offset,
                "dropping truncated tail left by an interrupted export"
            );
            file.set_len(scan.end_offset)?;
        }
        file.seek(SeekFrom::End(0))?;

        let next_height = scan.first_height + scan.blocks;
        debug!(
            target: "chainpack_archive",
            first_height = scan.first_height,
            blocks_present = scan.blocks,
            next_height,
            "appending to existing archive"
        );

        Ok(Self {
            file: BufWriter::new(file),
            buffer: ChunkBuffer::new(),
            chunk_interval: DEFAULT_CHUNK_INTERVAL,
            buffered_blocks: 0,
            first_height: scan.first_height,
            next_height,
            blocks_written: 0,
            max_chunk: 0,
        })
    }

    fn create_new(path: &Path, first_height: u64, last_height: u64) -> Result<Self, ArchiveError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| ArchiveError::Open { path: path.to_path_buf(), source })?;
        let mut writer = BufWriter::new(file);

        let mut header = Vec::with_capacity(HEADER_SIZE as usize);
        header.extend_from_slice(&ARCHIVE_MAGIC.to_le_bytes());
        codec::encode_record(&mut header, &FileInfo::current())?;
        codec::encode_record(&mut header, &BlocksInfo::new(first_height, last_height))?;
        debug_assert!(header.len() <= HEADER_SIZE as usize);
        header.resize(HEADER_SIZE as usize, 0);
        writer.write_all(&header)?;

        debug!(target: "chainpack_archive", first_height, "created new archive");

        Ok(Self {
            file: writer,
            buffer: ChunkBuffer::new(),
            chunk_interval: DEFAULT_CHUNK_INTERVAL,
            buffered_blocks: 0,
            first_height,
            next_height: first_height,
            blocks_written: 0,
            max_chunk: 0,
        })
    }

    /// Sets how many blocks accumulate before the buffer is flushed as one
    /// chunk. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_chunk_interval(mut self, blocks: u64) -> Self {
        self.chunk_interval = blocks.max(1);
        self
    }

    /// Height of the first block in the file.
    pub const fn first_height(&self) -> u64 {
        self.first_height
    }

    /// The height the next appended package must carry.
    pub const fn next_height(&self) -> u64 {
        self.next_height
    }

    /// Blocks appended by this writer instance (committed or buffered).
    pub const fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    /// Size in bytes of the largest chunk produced so far; a sizing hint
    /// for readers.
    pub const fn max_chunk(&self) -> u32 {
        self.max_chunk
    }

    /// Serializes `package` into the chunk buffer, flushing to disk when
    /// the chunking interval is reached.
    ///
    /// The package's embedded coinbase height must be exactly
    /// [`ArchiveWriter::next_height`], and its transaction set must match
    /// the block's hash list in length — resumability depends on the
    /// height sequence, so the writer refuses gaps rather than trusting
    /// caller discipline.
    pub fn append(&mut self, package: &BlockPackage) -> Result<(), ArchiveError> {
        let expected = self.next_height;
        let found = package.height().ok_or(ArchiveError::MissingHeight { expected })?;
        if found != expected {
            return Err(ArchiveError::OutOfOrder { expected, found });
        }
        let referenced = package.block.tx_hashes.len();
        if package.txs.len() != referenced {
            return Err(ArchiveError::TxCountMismatch {
                height: found,
                expected: referenced,
                found: package.txs.len(),
            });
        }

        codec::encode_record(&mut self.buffer, package)?;
        self.next_height += 1;
        self.blocks_written += 1;
        self.buffered_blocks += 1;

        if self.buffered_blocks >= self.chunk_interval {
            self.flush_chunk()?;
        }
        Ok(())
    }

    /// Writes the buffered bytes as one `length | payload` chunk and
    /// resets the buffer. No-op when nothing is buffered.
    pub fn flush_chunk(&mut self) -> Result<(), ArchiveError> {
        if self.buffer.is_empty() {
            self.buffered_blocks = 0;
            return Ok(());
        }

        let size = u32::try_from(self.buffer.len())
            .map_err(|_| ArchiveError::Encode(Box::new(bincode::ErrorKind::SizeLimit)))?;
        if size > CHUNK_SIZE_WARN {
            warn!(target: "chainpack_archive", size, "chunk size exceeds soft target");
        }

        self.file.write_all(&size.to_le_bytes())?;
        self.file.write_all(self.buffer.as_slice())?;
        self.file.flush()?;

        if size > self.max_chunk {
            self.max_chunk = size;
        }
        debug!(target: "chainpack_archive", size, blocks = self.buffered_blocks, "flushed chunk");

        self.buffer.reset();
        self.buffered_blocks = 0;
        Ok(())
    }

    /// Flushes any buffered remainder and the underlying stream.
    ///
    /// Must be called at the end of a run: a finished file never ends with
    /// buffered-but-unwritten blocks.
    pub fn finish(mut self) -> Result<(), ArchiveError> {
        self.flush_chunk()?;
        self.file.flush()?;
        Ok(())
    }
}
