//! End-to-end tests over the writer/reader protocol and the export driver.

use alloy_primitives::B256;
use chainpack_archive::{
    ArchiveError, ArchiveReader, ArchiveWriter, ExportOptions, Exporter, HEADER_SIZE,
};
use chainpack_source::MemoryChain;
use chainpack_types::{Block, BlockHeader, BlockPackage, Transaction};
use rstest::rstest;
use std::{fs, path::Path};
use tempfile::TempDir;

/// Deterministic 32-byte id derived from a height and an index.
fn test_hash(height: u64, index: u8) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&height.to_le_bytes());
    bytes[8] = index;
    bytes[31] = 0x5A;
    B256::from(bytes)
}

/// A block package at `height` carrying `tx_count` resolved transactions
/// and full metadata.
fn sample_package(height: u64, tx_count: u8) -> BlockPackage {
    let tx_hashes: Vec<B256> = (0..tx_count).map(|i| test_hash(height, i)).collect();
    let txs: Vec<Transaction> = (0..tx_count)
        .map(|i| Transaction {
            version: 2,
            unlock_time: 0,
            inputs: vec![],
            outputs: vec![],
            extra: vec![height as u8, i],
        })
        .collect();
    let block = Block {
        header: BlockHeader {
            major_version: 16,
            minor_version: 16,
            timestamp: 1_700_000_000 + height,
            prev_id: test_hash(height.wrapping_sub(1), 0xFF),
            nonce: height as u32,
        },
        miner_tx: Transaction::coinbase(height, 600_000_000_000, test_hash(height, 0xCB)),
        tx_hashes,
    };
    BlockPackage {
        block,
        txs,
        block_weight: Some(1000 + height),
        cumulative_difficulty: Some(height * height),
        coins_generated: Some(height * 600),
    }
}

fn write_archive(path: &Path, first: u64, packages: &[BlockPackage], interval: u64) {
    let mut writer = ArchiveWriter::open_for_append(path, first, first + packages.len() as u64)
        .unwrap()
        .with_chunk_interval(interval);
    for package in packages {
        writer.append(package).unwrap();
    }
    writer.finish().unwrap();
}

fn read_all(path: &Path) -> Vec<BlockPackage> {
    ArchiveReader::open_for_read(path)
        .unwrap()
        .read_blocks()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn round_trip_preserves_every_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.bin");
    let packages: Vec<_> = (0..10).map(|h| sample_package(h, (h % 3) as u8)).collect();

    write_archive(&path, 0, &packages, 4);
    assert_eq!(read_all(&path), packages);
}

#[test]
fn resumed_append_equals_a_single_pass() {
    let dir = TempDir::new().unwrap();
    let resumed = dir.path().join("resumed.bin");
    let single = dir.path().join("single.bin");
    let packages: Vec<_> = (0..10).map(|h| sample_package(h, 1)).collect();

    let mut writer =
        ArchiveWriter::open_for_append(&resumed, 0, 9).unwrap().with_chunk_interval(2);
    for package in &packages[..6] {
        writer.append(package).unwrap();
    }
    writer.finish().unwrap();

    let writer = ArchiveWriter::open_for_append(&resumed, 0, 9).unwrap();
    assert_eq!(writer.next_height(), 6);
    let mut writer = writer.with_chunk_interval(2);
    for package in &packages[6..] {
        writer.append(package).unwrap();
    }
    writer.finish().unwrap();

    let mut writer =
        ArchiveWriter::open_for_append(&single, 0, 9).unwrap().with_chunk_interval(2);
    for package in &packages {
        writer.append(package).unwrap();
    }
    writer.finish().unwrap();
    assert_eq!(read_all(&resumed), read_all(&single));
    assert_eq!(fs::read(&resumed).unwrap(), fs::read(&single).unwrap());
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(100)]
fn decoded_sequence_is_independent_of_chunk_interval(#[case] interval: u64) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.bin");
    let packages: Vec<_> = (0..25).map(|h| sample_package(h, 2)).collect();

    write_archive(&path, 0, &packages, interval);
    assert_eq!(read_all(&path), packages);

    let summary = ArchiveReader::count_blocks(&path).unwrap();
    assert_eq!(summary.blocks, 25);
}

#[test]
fn count_blocks_reports_three_blocks_from_height_100() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.bin");
    let packages: Vec<_> = (100..103).map(|h| sample_package(h, 1)).collect();

    write_archive(&path, 100, &packages, 1);
    let summary = ArchiveReader::count_blocks(&path).unwrap();
    assert_eq!(summary.blocks, 3);
    assert_eq!(summary.first_height, 100);
    assert_eq!(summary.end_offset, fs::metadata(&path).unwrap().len());
}

#[test]
fn truncation_at_a_chunk_boundary_reads_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.bin");
    let packages: Vec<_> = (0..5).map(|h| sample_package(h, 1)).collect();
    write_archive(&path, 0, &packages, 1);

    // Walk three chunks to find the boundary after the third block.
    let mut stream = ArchiveReader::open_for_read(&path).unwrap().read_blocks();
    for _ in 0..3 {
        stream.next().unwrap().unwrap();
    }
    let boundary = stream.chunk_position();
    drop(stream);

    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(boundary).unwrap();
    drop(file);

    let summary = ArchiveReader::count_blocks(&path).unwrap();
    assert_eq!(summary.blocks, 3);
    assert_eq!(summary.end_offset, boundary);
    assert_eq!(read_all(&path), packages[..3]);
}

#[test]
fn truncation_mid_chunk_is_corruption_for_the_stream_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.bin");
    let packages: Vec<_> = (0..5).map(|h| sample_package(h, 1)).collect();
    write_archive(&path, 0, &packages, 1);

    let mut stream = ArchiveReader::open_for_read(&path).unwrap().read_blocks();
    for _ in 0..3 {
        stream.next().unwrap().unwrap();
    }
    let boundary = stream.chunk_position();
    drop(stream);

    // Cut into the fourth chunk: length field plus three payload bytes.
    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(boundary + 7).unwrap();
    drop(file);

    // The tolerant scan stops at the last complete chunk.
    let summary = ArchiveReader::count_blocks(&path).unwrap();
    assert_eq!(summary.blocks, 3);
    assert_eq!(summary.end_offset, boundary);

    // The strict stream yields the complete blocks, then corruption.
    let mut stream = ArchiveReader::open_for_read(&path).unwrap().read_blocks();
    for expected in &packages[..3] {
        assert_eq!(&stream.next().unwrap().unwrap(), expected);
    }
    let err = stream.next().unwrap().unwrap_err();
    assert!(matches!(err, ArchiveError::Corruption { offset, .. } if offset == boundary));
    assert!(stream.next().is_none(), "stream must fuse after corruption");
}

#[test]
fn resuming_after_a_torn_flush_drops_the_partial_chunk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.bin");
    let packages: Vec<_> = (0..5).map(|h| sample_package(h, 1)).collect();
    write_archive(&path, 0, &packages[..4], 1);

    // Tear the last chunk as an interrupted flush would.
    let torn_len = fs::metadata(&path).unwrap().len() - 3;
    let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(torn_len).unwrap();
    drop(file);

    // The writer resumes at the last committed height and rewrites it.
    let mut writer = ArchiveWriter::open_for_append(&path, 0, 4).unwrap();
    assert_eq!(writer.next_height(), 3);
    writer.append(&packages[3]).unwrap();
    writer.append(&packages[4]).unwrap();
    writer.finish().unwrap();

    assert_eq!(read_all(&path), packages);
}

#[test]
fn restart_from_a_recorded_chunk_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.bin");
    let packages: Vec<_> = (0..6).map(|h| sample_package(h, 1)).collect();
    write_archive(&path, 0, &packages, 2);

    let mut stream = ArchiveReader::open_for_read(&path).unwrap().read_blocks();
    stream.next().unwrap().unwrap();
    stream.next().unwrap().unwrap();
    let offset = stream.chunk_position();
    drop(stream);

    let mut reader = ArchiveReader::open_for_read(&path).unwrap();
    reader.seek_to_chunk(offset).unwrap();
    let rest: Vec<_> = reader.read_blocks().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rest, packages[2..]);
}

#[test]
fn corrupted_magic_fails_before_any_chunk_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.bin");
    write_archive(&path, 0, &[sample_package(0, 0)], 1);

    let mut bytes = fs::read(&path).unwrap();
    bytes[1] ^= 0x40;
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        ArchiveReader::open_for_read(&path).unwrap_err(),
        ArchiveError::Format { .. }
    ));
    assert!(matches!(
        ArchiveReader::count_blocks(&path).unwrap_err(),
        ArchiveError::Format { .. }
    ));
}

/// A ten-block chain where every block confirms one transaction.
fn sample_chain(len: u64) -> MemoryChain {
    let mut chain = MemoryChain::new();
    for height in 0..len {
        let package = sample_package(height, 1);
        chain.insert_tx(package.block.tx_hashes[0], package.txs[0].clone());
        chain.push_block(test_hash(height, 0xB0), package.block.clone()).unwrap();
        chain
            .set_block_meta(height, Some(1000 + height), Some(height * height), Some(height * 600))
            .unwrap();
    }
    chain
}

#[test]
fn exporter_writes_the_chain_and_resumes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.bin");
    let chain = sample_chain(10);

    // First run: capped at height 5.
    let opts = ExportOptions { stop_height: 5, ..ExportOptions::default() };
    let summary = Exporter::new(&chain, opts).run(&path).unwrap();
    assert_eq!(summary.resume_height, 0);
    assert_eq!(summary.blocks_written, 6);

    // Second run: uncapped, resumes at 6 and finishes the chain.
    let summary = Exporter::new(&chain, ExportOptions::default()).run(&path).unwrap();
    assert_eq!(summary.resume_height, 6);
    assert_eq!(summary.stop_height, 9);
    assert_eq!(summary.blocks_written, 4);

    let expected: Vec<_> = (0..10).map(|h| sample_package(h, 1)).collect();
    assert_eq!(read_all(&path), expected);

    // Third run: nothing new to do.
    let summary = Exporter::new(&chain, ExportOptions::default()).run(&path).unwrap();
    assert_eq!(summary.blocks_written, 0);
}

#[test]
fn exporter_skips_metadata_when_disabled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.bin");
    let chain = sample_chain(3);

    let opts = ExportOptions { include_metadata: false, ..ExportOptions::default() };
    Exporter::new(&chain, opts).run(&path).unwrap();

    for package in read_all(&path) {
        assert_eq!(package.block_weight, None);
        assert_eq!(package.cumulative_difficulty, None);
        assert_eq!(package.coins_generated, None);
    }
}

#[test]
fn empty_archive_has_only_the_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.bin");
    write_archive(&path, 7, &[], 1);

    assert_eq!(fs::metadata(&path).unwrap().len(), u64::from(HEADER_SIZE));
    let summary = ArchiveReader::count_blocks(&path).unwrap();
    assert_eq!(summary.blocks, 0);
    assert_eq!(summary.first_height, 7);
}
