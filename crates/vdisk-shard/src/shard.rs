//! In-memory block shard.

use std::collections::HashMap;

use tracing::debug;
use vdisk_types::{BlockAddress, ShardSeed};

use crate::error::ShardError;

/// One partition of a vdisk's address space.
///
/// Values are any fixed-size `Copy` payload; the reference model stores a
/// single byte per address. Cloning a shard deep-copies its block map, so
/// the clone and the source never share mutable state.
#[derive(Debug, Clone)]
pub struct Shard<V: Copy = u8> {
    healthy: bool,
    blocks: HashMap<BlockAddress, V>,
    seed: ShardSeed,
}

impl<V: Copy> Shard<V> {
    /// Create an empty, healthy shard with a freshly drawn seed.
    pub fn new() -> Self {
        Self::with_seed(ShardSeed::random())
    }

    /// Create an empty, healthy shard with the given seed.
    pub fn with_seed(seed: ShardSeed) -> Self {
        Self {
            healthy: true,
            blocks: HashMap::new(),
            seed,
        }
    }

    /// Store `value` at `address`, replacing any previous value.
    pub fn set_block(&mut self, address: BlockAddress, value: V) {
        debug!(address, "storing block in shard");
        self.blocks.insert(address, value);
    }

    /// Return the value stored at `address`.
    pub fn get_block(&self, address: BlockAddress) -> Result<V, ShardError> {
        self.blocks
            .get(&address)
            .copied()
            .ok_or(ShardError::BlockNotFound(address))
    }

    /// Whether a value is stored at `address`.
    pub fn contains(&self, address: BlockAddress) -> bool {
        self.blocks.contains_key(&address)
    }

    /// Whether the shard may serve reads and writes.
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Mark the shard healthy or unhealthy.
    pub fn set_health(&mut self, healthy: bool) {
        self.healthy = healthy;
    }

    /// Number of addresses currently stored.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The seed used to perturb hash-based routing away from this shard.
    pub fn seed(&self) -> &ShardSeed {
        &self.seed
    }

    /// Iterate over stored `(address, value)` pairs in no particular order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockAddress, V)> + '_ {
        self.blocks.iter().map(|(address, value)| (*address, *value))
    }

    /// Copy out every stored pair, sorted by address.
    pub fn snapshot(&self) -> Vec<(BlockAddress, V)> {
        let mut entries: Vec<_> = self.blocks().collect();
        entries.sort_unstable_by_key(|(address, _)| *address);
        entries
    }
}

impl<V: Copy> Default for Shard<V> {
    fn default() -> Self {
        Self::new()
    }
}
