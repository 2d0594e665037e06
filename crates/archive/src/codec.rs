//! Deterministic record serialization.
//!
//! Every record in the container — the two header records and every block
//! package — is framed the same way: a `u32` little-endian byte length
//! followed by the bincode encoding of the record with fixed-width
//! little-endian integers. One framing for everything is what keeps the
//! structural scan (`count_blocks`) free of block decoding.

use crate::error::ArchiveError;
use bincode::Options;
use serde::{Serialize, de::DeserializeOwned};
use std::io::Write;

/// The deterministic bincode configuration shared by writer and reader.
///
/// Fixed-width integer encoding and little-endian byte order give identical
/// bytes for identical values on every platform; trailing bytes inside a
/// record frame are rejected.
fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Serializes `value` as one length-prefixed record into `out`.
pub(crate) fn encode_record<T: Serialize, W: Write>(
    out: &mut W,
    value: &T,
) -> Result<(), ArchiveError> {
    let size = options().serialized_size(value).map_err(ArchiveError::Encode)?;
    let size = u32::try_from(size)
        .map_err(|_| ArchiveError::Encode(Box::new(bincode::ErrorKind::SizeLimit)))?;
    out.write_all(&size.to_le_bytes())?;
    options().serialize_into(out, value).map_err(ArchiveError::Encode)
}

/// Decodes one record from the exact bytes of its frame.
pub(crate) fn decode_record<T: DeserializeOwned>(frame: &[u8]) -> Result<T, bincode::Error> {
    options().deserialize(frame)
}

/// Iterator over the length-prefixed record frames of a chunk payload.
///
/// Yields `(relative_offset, frame_bytes)` for each record; a malformed
/// frame (length field cut short, or a frame overrunning the payload)
/// yields `Err(relative_offset)` once and then the iterator is exhausted.
pub(crate) struct Frames<'a> {
    payload: &'a [u8],
    pos: usize,
}

impl<'a> Frames<'a> {
    pub(crate) const fn new(payload: &'a [u8]) -> Self {
        Self { payload, pos: 0 }
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<(usize, &'a [u8]), usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.payload.len() {
            return None;
        }
        let start = self.pos;
        let rest = &self.payload[start..];
        if rest.len() < 4 {
            self.pos = self.payload.len();
            return Some(Err(start));
        }
        let len = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        if rest.len() - 4 < len {
            self.pos = self.payload.len();
            return Some(Err(start));
        }
        self.pos = start + 4 + len;
        Some(Ok((start, &rest[4..4 + len])))
    }
}
