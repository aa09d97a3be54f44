//! Error types for shard operations.

use vdisk_types::BlockAddress;

/// Errors that can occur during shard operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShardError {
    /// The requested address has never been written to this shard.
    #[error("block not found: {0}")]
    BlockNotFound(BlockAddress),
}
