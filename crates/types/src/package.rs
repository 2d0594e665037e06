//! Block package: the unit the archive stores.

use crate::{Block, Transaction};
use serde::{Deserialize, Serialize};

/// A block together with its fully resolved transaction set and optional
/// per-block chain metadata.
///
/// `txs` must hold exactly the transactions referenced by
/// `block.tx_hashes`, in the same order. The archive writer enforces the
/// count; resolving the hashes is the export driver's job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockPackage {
    /// The block itself.
    pub block: Block,
    /// The transactions referenced by `block.tx_hashes`, in block order.
    pub txs: Vec<Transaction>,
    /// Block weight, when the source store tracks it.
    pub block_weight: Option<u64>,
    /// Cumulative chain difficulty at this block, when tracked.
    pub cumulative_difficulty: Option<u64>,
    /// Total coins generated up to and including this block, when tracked.
    pub coins_generated: Option<u64>,
}

impl BlockPackage {
    /// Packages a block with its resolved transactions and no metadata.
    pub fn new(block: Block, txs: Vec<Transaction>) -> Self {
        Self { block, txs, block_weight: None, cumulative_difficulty: None, coins_generated: None }
    }

    /// The authoritative height of the packaged block.
    pub fn height(&self) -> Option<u64> {
        self.block.height()
    }
}
