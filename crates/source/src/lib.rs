//! Read-only access to an already-initialized chain store.
//!
//! The export driver only ever consumes a chain store through the
//! [`BlockSource`] trait; the store engine itself (LMDB, RocksDB, a remote
//! node, ...) lives behind it. [`MemoryChain`] is the in-process
//! implementation used by tests and embedders.

mod memory;
mod traits;

pub use memory::MemoryChain;
pub use traits::{BlockSource, SourceError};
