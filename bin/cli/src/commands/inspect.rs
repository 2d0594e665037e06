//! Inspect Subcommand

use anyhow::Result;
use chainpack_archive::{ArchiveReader, ScanSummary};
use clap::Parser;
use std::path::PathBuf;

/// The `inspect` Subcommand
///
/// Prints the header records of an archive file together with a structural
/// scan: blocks present, height range, and where the committed data ends.
///
/// # Usage
///
/// ```sh
/// chainpack inspect <FILE>
/// ```
#[derive(Parser, Debug, Clone)]
#[command(about = "Print the header and a structural summary of an archive file")]
pub struct InspectCommand {
    /// Path to the archive file.
    pub file: PathBuf,
}

impl InspectCommand {
    /// Runs the subcommand.
    pub fn run(self) -> Result<()> {
        let reader = ArchiveReader::open_for_read(&self.file)?;
        let file_info = reader.file_info();
        let blocks_info = reader.blocks_info();

        let ScanSummary { blocks, end_offset, first_height } =
            ArchiveReader::count_blocks(&self.file)?;
        let file_len = std::fs::metadata(&self.file)?.len();

        println!("--------------------------");
        println!("Archive: {}", self.file.display());
        println!("Format version: {}.{}", file_info.major_version, file_info.minor_version);
        println!("Header size: {} bytes", file_info.header_size);
        println!("First height: {first_height}");
        println!("Stop height hint: {}", blocks_info.last_block_height_hint);
        println!("Blocks present: {blocks}");
        if blocks > 0 {
            println!("Height range: {first_height}..={}", first_height + blocks - 1);
        }
        println!("Data ends at offset: {end_offset}");
        if file_len > end_offset {
            println!("Trailing bytes (truncated tail): {}", file_len - end_offset);
        }
        println!("--------------------------");
        Ok(())
    }
}
