//! Core data model for the chainpack container format.
//!
//! These are plain serde-serializable records with no I/O of their own: the
//! archive crate decides how they are framed on disk, and the source crate
//! decides where they come from.

mod block;
mod package;
mod transaction;

pub use block::{Block, BlockHeader};
pub use package::BlockPackage;
pub use transaction::{Transaction, TxInput, TxOutput};
