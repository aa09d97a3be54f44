//! Error types for the engine.

use vdisk_routing::RoutingError;
use vdisk_shard::ShardError;
use vdisk_types::{BlockAddress, ShardIndex};

/// Errors that can occur during vdisk operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VdiskError {
    /// The resolved shard holds no value for the address.
    #[error("block not found: {0}")]
    BlockNotFound(BlockAddress),

    /// The resolved shard is marked unhealthy. Nothing was mutated.
    #[error("shard {0} is not healthy")]
    ShardNotHealthy(ShardIndex),

    /// No shard could be resolved, or a shard index was out of range.
    #[error("shard index not found: {0}")]
    ShardIndexNotFound(#[from] RoutingError),

    /// A vdisk needs at least one shard.
    #[error("a vdisk needs at least one shard")]
    NoShards,
}

impl From<ShardError> for VdiskError {
    fn from(err: ShardError) -> Self {
        match err {
            ShardError::BlockNotFound(address) => VdiskError::BlockNotFound(address),
        }
    }
}
