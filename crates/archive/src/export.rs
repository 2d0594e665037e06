//! The export driver: one sequential pass from a block source into a
//! container file.

use crate::{
    error::ArchiveError,
    format::DEFAULT_CHUNK_INTERVAL,
    writer::ArchiveWriter,
};
use alloy_primitives::B256;
use chainpack_source::{BlockSource, SourceError};
use chainpack_types::BlockPackage;
use std::path::Path;
use tracing::{info, warn};

/// Heights between best-effort progress reports.
const PROGRESS_INTERVAL: u64 = 100;

/// Configuration for one export run.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// First height to export when creating a new file. Ignored on resume:
    /// the file dictates where appending continues.
    pub start_height: u64,
    /// Requested stop height. Zero means "up to the chain tip"; a nonzero
    /// value only lowers the effective stop, never raises it past the tip.
    pub stop_height: u64,
    /// Blocks per chunk.
    pub chunk_interval: u64,
    /// Whether to attach per-block weight/difficulty/coins metadata when
    /// the source tracks it.
    pub include_metadata: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            start_height: 0,
            stop_height: 0,
            chunk_interval: DEFAULT_CHUNK_INTERVAL,
            include_metadata: true,
        }
    }
}

/// What an export run accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Height of the first block in the file.
    pub first_height: u64,
    /// Height the run started appending at.
    pub resume_height: u64,
    /// Effective stop height of the run.
    pub stop_height: u64,
    /// Blocks appended by this run.
    pub blocks_written: u64,
    /// Largest chunk produced by this run, in bytes.
    pub max_chunk: u32,
}

/// Drives a height range from a [`BlockSource`] into a container file.
///
/// Fails fast: any block or transaction the source cannot resolve — or a
/// null id where a real one is required — aborts the run with the exact
/// height, since that signals store corruption rather than anything a
/// retry could fix.
#[derive(Debug)]
pub struct Exporter<'a, S> {
    source: &'a S,
    opts: ExportOptions,
}

impl<'a, S: BlockSource> Exporter<'a, S> {
    /// Creates a driver over `source` with the given options.
    pub const fn new(source: &'a S, opts: ExportOptions) -> Self {
        Self { source, opts }
    }

    /// Runs the export into `path`, resuming if the file already has
    /// content.
    pub fn run(&self, path: &Path) -> Result<ExportSummary, ArchiveError> {
        let current = self
            .source
            .current_height()
            .map_err(|source| ArchiveError::Resolution { height: 0, source })?;
        if current == 0 {
            return Err(ArchiveError::Resolution { height: 0, source: SourceError::EmptyChain });
        }

        let mut stop_height = current - 1;
        if self.opts.stop_height > 0 && self.opts.stop_height < stop_height {
            info!(
                target: "chainpack_archive",
                stop_height = self.opts.stop_height,
                "using requested stop height"
            );
            stop_height = self.opts.stop_height;
        }

        let mut writer = ArchiveWriter::open_for_append(path, self.opts.start_height, stop_height)?
            .with_chunk_interval(self.opts.chunk_interval);
        let resume_height = writer.next_height();
        let first_height = writer.first_height();

        if self.opts.start_height != first_height {
            warn!(
                target: "chainpack_archive",
                requested = self.opts.start_height,
                resume_height,
                "resuming from on-disk content, ignoring requested start height"
            );
        }

        if resume_height > stop_height {
            info!(target: "chainpack_archive", resume_height, stop_height, "already caught up");
            writer.finish()?;
            return Ok(ExportSummary {
                first_height,
                resume_height,
                stop_height,
                blocks_written: 0,
                max_chunk: 0,
            });
        }

        info!(
            target: "chainpack_archive",
            resume_height,
            stop_height,
            "storing blocks"
        );
        for height in resume_height..=stop_height {
            let package = self.package_at(height)?;
            writer.append(&package)?;
            if height % PROGRESS_INTERVAL == 0 {
                info!(target: "chainpack_archive", height, stop_height, "export progress");
            }
        }

        writer.flush_chunk()?;
        let blocks_written = writer.blocks_written();
        let max_chunk = writer.max_chunk();
        writer.finish()?;

        info!(target: "chainpack_archive", blocks_written, max_chunk, "export complete");
        Ok(ExportSummary { first_height, resume_height, stop_height, blocks_written, max_chunk })
    }

    /// Assembles the block package for `height`, resolving every
    /// referenced transaction through the source.
    fn package_at(&self, height: u64) -> Result<BlockPackage, ArchiveError> {
        let resolution = |source| ArchiveError::Resolution { height, source };

        let id = self.source.block_id_at(height).map_err(resolution)?;
        if id == B256::ZERO {
            return Err(resolution(SourceError::NullHash));
        }
        let block = self.source.block_by_id(&id).map_err(resolution)?;

        let mut txs = Vec::with_capacity(block.tx_hashes.len());
        for tx_id in &block.tx_hashes {
            if *tx_id == B256::ZERO {
                return Err(resolution(SourceError::NullHash));
            }
            txs.push(self.source.tx_by_id(tx_id).map_err(resolution)?);
        }

        let mut package = BlockPackage::new(block, txs);
        if self.opts.include_metadata {
            package.block_weight = self.source.block_weight(height).map_err(resolution)?;
            package.cumulative_difficulty =
                self.source.cumulative_difficulty(height).map_err(resolution)?;
            package.coins_generated = self.source.coins_generated(height).map_err(resolution)?;
        }
        Ok(package)
    }
}
