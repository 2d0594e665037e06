//! Block and block header types.

use crate::Transaction;
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Header fields of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Consensus major version the block was produced under.
    pub major_version: u32,
    /// Consensus minor version (vote).
    pub minor_version: u32,
    /// Block timestamp (seconds since Unix epoch).
    pub timestamp: u64,
    /// Hash of the previous block in the chain.
    pub prev_id: B256,
    /// Proof-of-work nonce.
    pub nonce: u32,
}

/// A block: header, miner transaction, and the hashes of the transactions
/// it confirms.
///
/// The block does not embed its own height; the height is carried by the
/// coinbase input of [`Block::miner_tx`] and read through [`Block::height`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Header fields.
    pub header: BlockHeader,
    /// Miner (coinbase) transaction.
    pub miner_tx: Transaction,
    /// Hashes of the non-coinbase transactions confirmed by this block,
    /// in block order.
    pub tx_hashes: Vec<B256>,
}

impl Block {
    /// The authoritative height of the block: the height embedded in the
    /// coinbase input of its miner transaction. `None` if the miner
    /// transaction does not start with a coinbase input.
    pub fn height(&self) -> Option<u64> {
        self.miner_tx.coinbase_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_comes_from_the_miner_tx() {
        let block = Block {
            header: BlockHeader::default(),
            miner_tx: Transaction::coinbase(1337, 600, B256::ZERO),
            tx_hashes: vec![],
        };
        assert_eq!(block.height(), Some(1337));
    }

    #[test]
    fn height_is_none_without_a_coinbase() {
        assert_eq!(Block::default().height(), None);
    }
}
