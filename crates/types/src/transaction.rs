//! Transaction types.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// A single transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxInput {
    /// Coinbase input minting the block reward. Its `height` field is the
    /// authoritative height of the block that carries the transaction.
    Coinbase {
        /// Height of the block this coinbase belongs to.
        height: u64,
    },
    /// Spend of a previously created output.
    Key {
        /// Amount being spent.
        amount: u64,
        /// Relative offsets of the ring members being referenced.
        key_offsets: Vec<u64>,
        /// Key image marking the output as spent.
        key_image: B256,
    },
}

/// A single transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxOutput {
    /// Amount carried by the output.
    pub amount: u64,
    /// One-time destination key.
    pub key: B256,
}

/// A transaction: inputs, outputs, and opaque extra data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,
    /// Height or timestamp before which outputs cannot be spent.
    pub unlock_time: u64,
    /// Ordered inputs.
    pub inputs: Vec<TxInput>,
    /// Ordered outputs.
    pub outputs: Vec<TxOutput>,
    /// Opaque extra field (tx public key, payment ids, ...).
    pub extra: Vec<u8>,
}

impl Transaction {
    /// Builds a minimal coinbase transaction for a block at `height` paying
    /// `reward` to `key`.
    pub fn coinbase(height: u64, reward: u64, key: B256) -> Self {
        Self {
            version: 1,
            unlock_time: 0,
            inputs: vec![TxInput::Coinbase { height }],
            outputs: vec![TxOutput { amount: reward, key }],
            extra: Vec::new(),
        }
    }

    /// Returns the coinbase height if the first input is a coinbase input.
    pub fn coinbase_height(&self) -> Option<u64> {
        match self.inputs.first() {
            Some(TxInput::Coinbase { height }) => Some(*height),
            _ => None,
        }
    }
}
