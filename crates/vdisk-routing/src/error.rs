//! Error types for routing.

use vdisk_types::{BlockAddress, ShardIndex};

/// Errors that can occur while resolving a shard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// No shard can own the address under the current topology.
    #[error("no shard index found for block {address}")]
    NoRoute {
        /// The address that could not be routed.
        address: BlockAddress,
    },

    /// A shard index outside the topology was referenced.
    #[error("shard index {index} out of range for {shard_count} shards")]
    OutOfRange {
        /// The requested index.
        index: ShardIndex,
        /// Number of shards in the topology.
        shard_count: usize,
    },

    /// A strategy name did not match any known strategy.
    #[error("unknown routing strategy: {0:?}")]
    UnknownStrategy(String),
}
