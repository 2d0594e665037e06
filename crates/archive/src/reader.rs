//! Reading and scanning container files.

use crate::{
    codec::{self, Frames},
    error::ArchiveError,
    format::{ARCHIVE_MAGIC, BlocksInfo, FileInfo, HEADER_SIZE, MAJOR_VERSION},
};
use chainpack_types::BlockPackage;
use serde::de::DeserializeOwned;
use std::{
    collections::VecDeque,
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
};
use tracing::warn;

/// Result of a structural scan over an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Number of block packages stored in complete chunks.
    pub blocks: u64,
    /// Byte offset just past the last complete chunk.
    pub end_offset: u64,
    /// Height of the first block in the file.
    pub first_height: u64,
}

/// Outcome of pulling one chunk off the stream.
enum RawChunk {
    /// Clean end-of-file exactly on a chunk boundary.
    Eof,
    /// A chunk started but the file ends before it completes.
    Truncated { reason: String },
    /// One complete chunk payload.
    Chunk(Vec<u8>),
}

/// A validated handle on an archive file, positioned at a chunk boundary.
#[derive(Debug)]
pub struct ArchiveReader {
    file: BufReader<File>,
    file_info: FileInfo,
    blocks_info: BlocksInfo,
    /// Absolute offset of the next chunk to read.
    position: u64,
}

impl ArchiveReader {
    /// Opens `path`, validates magic and header records, and positions the
    /// handle at the first chunk.
    pub fn open_for_read(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path)
            .map_err(|source| ArchiveError::Open { path: path.to_path_buf(), source })?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut magic_buf = [0u8; 4];
        let got = read_fully(&mut reader, &mut magic_buf)?;
        if got < 4 {
            return Err(ArchiveError::Corruption {
                offset: got as u64,
                reason: "file truncated inside magic number".into(),
            });
        }
        let magic = u32::from_le_bytes(magic_buf);
        if magic != ARCHIVE_MAGIC {
            return Err(ArchiveError::Format { found: magic });
        }

        let mut position = 4u64;
        let file_info: FileInfo = read_header_record(&mut reader, &mut position)?;
        if file_info.major_version != MAJOR_VERSION {
            return Err(ArchiveError::Version { found: file_info.major_version });
        }
        let blocks_info: BlocksInfo = read_header_record(&mut reader, &mut position)?;

        let header_size = u64::from(file_info.header_size);
        if header_size < position {
            return Err(ArchiveError::Corruption {
                offset: 4,
                reason: format!("recorded header size {header_size} smaller than header records"),
            });
        }
        if file_len < header_size {
            return Err(ArchiveError::Corruption {
                offset: file_len,
                reason: "file truncated inside header region".into(),
            });
        }

        reader.seek(SeekFrom::Start(header_size))?;
        Ok(Self { file: reader, file_info, blocks_info, position: header_size })
    }

    /// The file-info header record.
    pub const fn file_info(&self) -> FileInfo {
        self.file_info
    }

    /// The blocks-info header record.
    pub const fn blocks_info(&self) -> BlocksInfo {
        self.blocks_info
    }

    /// Absolute offset of the next chunk.
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Repositions the handle at `offset`, which must be a chunk-start
    /// offset previously observed via [`ArchiveReader::position`].
    pub fn seek_to_chunk(&mut self, offset: u64) -> Result<(), ArchiveError> {
        if offset < u64::from(self.file_info.header_size) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "chunk offset lies inside the header region",
            )
            .into());
        }
        self.file.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    /// Structural scan: counts the block packages stored in complete
    /// chunks without decoding them.
    ///
    /// A truncated tail chunk ends the scan at the last complete chunk —
    /// an interrupted export leaves one behind and it is not an error
    /// here. Garbage inside a complete chunk is.
    pub fn count_blocks(path: &Path) -> Result<ScanSummary, ArchiveError> {
        let mut reader = Self::open_for_read(path)?;
        let first_height = reader.blocks_info.first_block_height;
        let mut blocks = 0u64;
        let mut end_offset = reader.position;

        loop {
            let chunk_start = reader.position;
            match reader.read_raw_chunk()? {
                RawChunk::Eof => break,
                RawChunk::Truncated { reason } => {
                    warn!(
                        target: "chainpack_archive",
                        offset = chunk_start,
                        %reason,
                        "ignoring truncated tail chunk"
                    );
                    break;
                }
                RawChunk::Chunk(payload) => {
                    let payload_start = chunk_start + 4;
                    for frame in Frames::new(&payload) {
                        match frame {
                            Ok(_) => blocks += 1,
                            Err(rel) => {
                                return Err(ArchiveError::Corruption {
                                    offset: payload_start + rel as u64,
                                    reason: "record frame overruns its chunk".into(),
                                });
                            }
                        }
                    }
                    end_offset = reader.position;
                }
            }
        }

        Ok(ScanSummary { blocks, end_offset, first_height })
    }

    /// Consumes the handle into a lazy iterator of block packages.
    pub fn read_blocks(self) -> BlockStream {
        BlockStream { reader: self, queue: VecDeque::new(), done: false }
    }

    /// Reads the next `length | payload` chunk. Distinguishes clean
    /// end-of-file on the chunk boundary from a chunk cut short by
    /// truncation. `position` only advances past complete chunks.
    fn read_raw_chunk(&mut self) -> Result<RawChunk, ArchiveError> {
        let mut len_buf = [0u8; 4];
        let got = read_fully(&mut self.file, &mut len_buf)?;
        if got == 0 {
            return Ok(RawChunk::Eof);
        }
        if got < 4 {
            return Ok(RawChunk::Truncated {
                reason: format!("chunk length field truncated after {got} bytes"),
            });
        }
        let len = u32::from_le_bytes(len_buf);
        if len == 0 {
            return Err(ArchiveError::Corruption {
                offset: self.position,
                reason: "zero-length chunk".into(),
            });
        }

        let mut payload = vec![0u8; len as usize];
        let got = read_fully(&mut self.file, &mut payload)?;
        if got < len as usize {
            return Ok(RawChunk::Truncated {
                reason: format!("chunk of {len} bytes truncated after {got}"),
            });
        }

        self.position += 4 + u64::from(len);
        Ok(RawChunk::Chunk(payload))
    }
}

/// Lazy sequence of block packages.
///
/// Each chunk's payload is decoded fully before any of its packages are
/// yielded; the stream advances to the next chunk only once the current
/// one is exhausted. Terminates at clean end-of-file on a chunk boundary;
/// anything else mid-chunk surfaces as [`ArchiveError::Corruption`], after
/// which the stream is fused.
#[derive(Debug)]
pub struct BlockStream {
    reader: ArchiveReader,
    queue: VecDeque<BlockPackage>,
    done: bool,
}

impl BlockStream {
    /// Offset of the next chunk. Only meaningful as a restart point while
    /// the current chunk is exhausted (between `next()` calls that cross a
    /// chunk boundary).
    pub const fn chunk_position(&self) -> u64 {
        self.reader.position()
    }

    /// Decodes the next chunk into the queue. `Ok(false)` means clean EOF.
    fn fill_queue(&mut self) -> Result<bool, ArchiveError> {
        let chunk_start = self.reader.position;
        match self.reader.read_raw_chunk()? {
            RawChunk::Eof => Ok(false),
            RawChunk::Truncated { reason } => {
                Err(ArchiveError::Corruption { offset: chunk_start, reason })
            }
            RawChunk::Chunk(payload) => {
                let payload_start = chunk_start + 4;
                let mut decoded = Vec::new();
                for frame in Frames::new(&payload) {
                    let (rel, bytes) = frame.map_err(|rel| ArchiveError::Corruption {
                        offset: payload_start + rel as u64,
                        reason: "record frame overruns its chunk".into(),
                    })?;
                    let package = codec::decode_record::<BlockPackage>(bytes).map_err(|err| {
                        ArchiveError::Corruption {
                            offset: payload_start + rel as u64,
                            reason: format!("undecodable block package: {err}"),
                        }
                    })?;
                    decoded.push(package);
                }
                self.queue.extend(decoded);
                Ok(true)
            }
        }
    }
}

impl Iterator for BlockStream {
    type Item = Result<BlockPackage, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while self.queue.is_empty() {
            match self.fill_queue() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        self.queue.pop_front().map(Ok)
    }
}

/// Reads one length-prefixed header record, advancing `position`.
fn read_header_record<T: DeserializeOwned>(
    reader: &mut BufReader<File>,
    position: &mut u64,
) -> Result<T, ArchiveError> {
    let offset = *position;
    let mut len_buf = [0u8; 4];
    let got = read_fully(reader, &mut len_buf)?;
    if got < 4 {
        return Err(ArchiveError::Corruption {
            offset,
            reason: "header record length truncated".into(),
        });
    }
    let len = u32::from_le_bytes(len_buf);
    if len == 0 || len > HEADER_SIZE {
        return Err(ArchiveError::Corruption {
            offset,
            reason: format!("implausible header record length {len}"),
        });
    }

    let mut frame = vec![0u8; len as usize];
    let got = read_fully(reader, &mut frame)?;
    if got < len as usize {
        return Err(ArchiveError::Corruption { offset, reason: "header record truncated".into() });
    }

    let value = codec::decode_record(&frame).map_err(|err| ArchiveError::Corruption {
        offset,
        reason: format!("undecodable header record: {err}"),
    })?;
    *position += 4 + u64::from(len);
    Ok(value)
}

/// Reads until `buf` is full or end-of-file; returns the bytes read.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, ArchiveError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(filled)
}
