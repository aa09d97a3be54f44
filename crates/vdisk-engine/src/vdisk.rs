//! The vdisk orchestrator.

use std::collections::BTreeSet;

use rand::RngCore;
use tracing::{debug, info};
use vdisk_routing::{RoutingError, RoutingStrategy, Topology};
use vdisk_shard::Shard;
use vdisk_types::{BlockAddress, ShardIndex, ShardReport, ShardSeed};

use crate::error::VdiskError;

/// A sharded virtual disk.
///
/// Owns a fixed-length list of shards (index = permanent shard identity),
/// the set of explicitly failed shards, and the routing strategy applied to
/// every operation. `Clone` deep-copies every shard.
#[derive(Debug, Clone)]
pub struct Vdisk<V: Copy = u8> {
    shards: Vec<Shard<V>>,
    offline: BTreeSet<ShardIndex>,
    strategy: RoutingStrategy,
}

impl<V: Copy> Vdisk<V> {
    /// Create a vdisk of `shard_count` empty, healthy shards with random seeds.
    pub fn new(shard_count: usize, strategy: RoutingStrategy) -> Result<Self, VdiskError> {
        Self::from_shards((0..shard_count).map(|_| Shard::new()).collect(), strategy)
    }

    /// Like [`Vdisk::new`], drawing every shard seed from `rng`.
    pub fn with_rng<R: RngCore + ?Sized>(
        shard_count: usize,
        strategy: RoutingStrategy,
        rng: &mut R,
    ) -> Result<Self, VdiskError> {
        let shards = (0..shard_count)
            .map(|_| Shard::with_seed(ShardSeed::from_rng(&mut *rng)))
            .collect();
        Self::from_shards(shards, strategy)
    }

    fn from_shards(shards: Vec<Shard<V>>, strategy: RoutingStrategy) -> Result<Self, VdiskError> {
        if shards.is_empty() {
            return Err(VdiskError::NoShards);
        }
        debug!(shard_count = shards.len(), %strategy, "created vdisk");
        Ok(Self {
            shards,
            offline: BTreeSet::new(),
            strategy,
        })
    }

    // -----------------------------------------------------------------------
    // Block I/O
    // -----------------------------------------------------------------------

    /// Write `value` at `address` on the shard the strategy resolves.
    ///
    /// Fails without mutating anything if that shard is unhealthy.
    pub fn set_block(&mut self, address: BlockAddress, value: V) -> Result<(), VdiskError> {
        let index = self.route(address)?;
        let shard = &mut self.shards[index];
        if !shard.is_healthy() {
            return Err(VdiskError::ShardNotHealthy(index));
        }
        shard.set_block(address, value);
        Ok(())
    }

    /// Read the value at `address` from the shard the strategy resolves.
    pub fn get_block(&self, address: BlockAddress) -> Result<V, VdiskError> {
        let index = self.route(address)?;
        let shard = &self.shards[index];
        if !shard.is_healthy() {
            return Err(VdiskError::ShardNotHealthy(index));
        }
        Ok(shard.get_block(address)?)
    }

    /// The shard index `address` currently resolves to.
    pub fn route(&self, address: BlockAddress) -> Result<ShardIndex, VdiskError> {
        Ok(self.strategy.route(self, address)?)
    }

    // -----------------------------------------------------------------------
    // Failure handling
    // -----------------------------------------------------------------------

    /// Take a shard offline and replay its blocks through [`Vdisk::set_block`].
    ///
    /// Returns the number of blocks replayed; failing an already offline shard
    /// is a no-op that returns 0. Replay walks a sorted copy of the failed
    /// shard's entries, and the failed shard keeps its own entries.
    ///
    /// Not atomic: the first write error aborts the replay and is returned,
    /// and blocks already re-homed stay where they landed. The shard remains
    /// offline either way.
    pub fn fail_shard(&mut self, index: ShardIndex) -> Result<usize, VdiskError> {
        if index >= self.shards.len() {
            return Err(RoutingError::OutOfRange {
                index,
                shard_count: self.shards.len(),
            }
            .into());
        }
        if !self.offline.insert(index) {
            debug!(index, "shard already offline");
            return Ok(0);
        }

        let shard = &mut self.shards[index];
        shard.set_health(false);
        let entries = shard.snapshot();

        info!(
            index,
            blocks = entries.len(),
            healthy = self.healthy_shards(),
            "shard failed, redistributing blocks"
        );

        for &(address, value) in &entries {
            self.set_block(address, value)?;
        }

        info!(index, moved = entries.len(), "redistribution complete");
        Ok(entries.len())
    }

    // -----------------------------------------------------------------------
    // Strategy
    // -----------------------------------------------------------------------

    /// The routing strategy applied to every operation.
    pub fn strategy(&self) -> RoutingStrategy {
        self.strategy
    }

    /// Switch the routing strategy.
    ///
    /// Blocks written under the previous strategy are not moved, so reads may
    /// miss them afterwards.
    pub fn set_strategy(&mut self, strategy: RoutingStrategy) {
        debug!(from = %self.strategy, to = %strategy, "switching routing strategy");
        self.strategy = strategy;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of shards. Fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// The shard at `index`, if in range.
    pub fn shard(&self, index: ShardIndex) -> Option<&Shard<V>> {
        self.shards.get(index)
    }

    /// Indices of explicitly failed shards, ascending.
    pub fn offline_shards(&self) -> &BTreeSet<ShardIndex> {
        &self.offline
    }

    /// Number of shards whose health flag is set.
    pub fn healthy_shards(&self) -> usize {
        self.shards.iter().filter(|s| s.is_healthy()).count()
    }

    /// Total number of blocks held by healthy shards.
    pub fn block_count(&self) -> usize {
        self.shards
            .iter()
            .filter(|s| s.is_healthy())
            .map(Shard::block_count)
            .sum()
    }

    /// Per-shard health and occupancy, in index order.
    pub fn report(&self) -> Vec<ShardReport> {
        self.shards
            .iter()
            .enumerate()
            .map(|(index, shard)| ShardReport {
                index,
                healthy: shard.is_healthy(),
                offline: self.offline.contains(&index),
                block_count: shard.block_count(),
            })
            .collect()
    }
}

impl<V: Copy> Topology for Vdisk<V> {
    fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn is_healthy(&self, index: ShardIndex) -> bool {
        self.shards[index].is_healthy()
    }

    fn is_offline(&self, index: ShardIndex) -> bool {
        self.offline.contains(&index)
    }

    fn seed(&self, index: ShardIndex) -> &ShardSeed {
        self.shards[index].seed()
    }
}
