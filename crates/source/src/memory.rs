//! In-memory chain store.

use crate::{BlockSource, SourceError};
use alloy_primitives::B256;
use chainpack_types::{Block, Transaction};
use std::collections::HashMap;

/// Per-height optional chain metadata.
#[derive(Debug, Clone, Copy, Default)]
struct BlockMeta {
    weight: Option<u64>,
    cumulative_difficulty: Option<u64>,
    coins_generated: Option<u64>,
}

/// An in-memory chain store.
///
/// Blocks are appended in height order; transactions are registered by id
/// before the blocks that reference them. Ids are supplied by the caller,
/// the store does not hash.
#[derive(Debug, Default)]
pub struct MemoryChain {
    /// `blocks[h]` is `(id, block)` for height `h`.
    blocks: Vec<(B256, Block)>,
    txs: HashMap<B256, Transaction>,
    meta: Vec<BlockMeta>,
}

impl MemoryChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transaction under `id`.
    pub fn insert_tx(&mut self, id: B256, tx: Transaction) {
        self.txs.insert(id, tx);
    }

    /// Appends `block` under `id` at the next height.
    ///
    /// The block's embedded coinbase height must equal the height it lands
    /// at; the store refuses gaps the same way a real chain store would.
    pub fn push_block(&mut self, id: B256, block: Block) -> Result<(), SourceError> {
        let expected = self.blocks.len() as u64;
        match block.height() {
            Some(h) if h == expected => {}
            other => {
                return Err(SourceError::Backend(format!(
                    "block height {other:?} does not match chain tip {expected}"
                )));
            }
        }
        self.blocks.push((id, block));
        self.meta.push(BlockMeta::default());
        Ok(())
    }

    /// Sets the optional metadata for the block at `height`.
    pub fn set_block_meta(
        &mut self,
        height: u64,
        weight: Option<u64>,
        cumulative_difficulty: Option<u64>,
        coins_generated: Option<u64>,
    ) -> Result<(), SourceError> {
        let meta = self
            .meta
            .get_mut(height as usize)
            .ok_or(SourceError::HeightNotFound(height))?;
        *meta = BlockMeta { weight, cumulative_difficulty, coins_generated };
        Ok(())
    }

    fn meta_at(&self, height: u64) -> Result<BlockMeta, SourceError> {
        self.meta
            .get(height as usize)
            .copied()
            .ok_or(SourceError::HeightNotFound(height))
    }
}

impl BlockSource for MemoryChain {
    fn current_height(&self) -> Result<u64, SourceError> {
        Ok(self.blocks.len() as u64)
    }

    fn block_id_at(&self, height: u64) -> Result<B256, SourceError> {
        self.blocks
            .get(height as usize)
            .map(|(id, _)| *id)
            .ok_or(SourceError::HeightNotFound(height))
    }

    fn block_by_id(&self, id: &B256) -> Result<Block, SourceError> {
        self.blocks
            .iter()
            .find(|(bid, _)| bid == id)
            .map(|(_, block)| block.clone())
            .ok_or(SourceError::BlockNotFound(*id))
    }

    fn tx_by_id(&self, id: &B256) -> Result<Transaction, SourceError> {
        self.txs.get(id).cloned().ok_or(SourceError::TxNotFound(*id))
    }

    fn block_weight(&self, height: u64) -> Result<Option<u64>, SourceError> {
        Ok(self.meta_at(height)?.weight)
    }

    fn cumulative_difficulty(&self, height: u64) -> Result<Option<u64>, SourceError> {
        Ok(self.meta_at(height)?.cumulative_difficulty)
    }

    fn coins_generated(&self, height: u64) -> Result<Option<u64>, SourceError> {
        Ok(self.meta_at(height)?.coins_generated)
    }
}
