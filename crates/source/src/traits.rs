//! The block source adapter seam.

use alloy_primitives::B256;
use chainpack_types::{Block, Transaction};
use thiserror::Error;

/// Errors a block source can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// No block exists at the requested height.
    #[error("no block at height {0}")]
    HeightNotFound(u64),

    /// No block exists with the requested id.
    #[error("no block with id {0}")]
    BlockNotFound(B256),

    /// No transaction exists with the requested id.
    #[error("no transaction with id {0}")]
    TxNotFound(B256),

    /// The store returned the null hash where a real id was required.
    #[error("null hash where a block or transaction id was required")]
    NullHash,

    /// The chain store holds no blocks at all.
    #[error("chain store is empty")]
    EmptyChain,

    /// The underlying store engine failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Read-only accessor over an already-initialized chain store.
///
/// Heights are dense: blocks occupy `0..current_height()` with no gaps, and
/// the top block sits at `current_height() - 1`. Implementations never
/// mutate the store.
pub trait BlockSource {
    /// Number of blocks in the chain (top height + 1).
    fn current_height(&self) -> Result<u64, SourceError>;

    /// Id of the block at `height`.
    fn block_id_at(&self, height: u64) -> Result<B256, SourceError>;

    /// The block with the given id.
    fn block_by_id(&self, id: &B256) -> Result<Block, SourceError>;

    /// The transaction with the given id.
    fn tx_by_id(&self, id: &B256) -> Result<Transaction, SourceError>;

    /// Weight of the block at `height`, when the store tracks it.
    fn block_weight(&self, _height: u64) -> Result<Option<u64>, SourceError> {
        Ok(None)
    }

    /// Cumulative difficulty at `height`, when the store tracks it.
    fn cumulative_difficulty(&self, _height: u64) -> Result<Option<u64>, SourceError> {
        Ok(None)
    }

    /// Coins generated up to `height`, when the store tracks it.
    fn coins_generated(&self, _height: u64) -> Result<Option<u64>, SourceError> {
        Ok(None)
    }
}
