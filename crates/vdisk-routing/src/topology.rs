//! The view of a vdisk that routing strategies are allowed to see.

use std::collections::BTreeSet;

use rand::RngCore;
use vdisk_types::{ShardIndex, ShardSeed};

use crate::error::RoutingError;

/// Shard count, per-shard health, offline set and seeds at one point in time.
///
/// Indices passed to the accessors are always `< shard_count()`.
pub trait Topology {
    /// Number of shards. Fixed for the lifetime of a vdisk.
    fn shard_count(&self) -> usize;

    /// Whether the shard at `index` may serve reads and writes.
    fn is_healthy(&self, index: ShardIndex) -> bool;

    /// Whether the shard at `index` was explicitly failed.
    fn is_offline(&self, index: ShardIndex) -> bool;

    /// Routing seed of the shard at `index`.
    fn seed(&self, index: ShardIndex) -> &ShardSeed;

    /// Number of currently healthy shards.
    fn healthy_count(&self) -> usize {
        (0..self.shard_count())
            .filter(|&index| self.is_healthy(index))
            .count()
    }
}

/// A self-contained topology with no block data attached.
///
/// Lets callers ask "where would this address go" without building a vdisk.
#[derive(Debug, Clone)]
pub struct StaticTopology {
    seeds: Vec<ShardSeed>,
    healthy: Vec<bool>,
    offline: BTreeSet<ShardIndex>,
}

impl StaticTopology {
    /// Build a topology of healthy shards with the given seeds.
    pub fn new(seeds: Vec<ShardSeed>) -> Self {
        let healthy = vec![true; seeds.len()];
        Self {
            seeds,
            healthy,
            offline: BTreeSet::new(),
        }
    }

    /// Build a topology of `shard_count` healthy shards with seeds drawn from `rng`.
    pub fn with_rng<R: RngCore + ?Sized>(shard_count: usize, rng: &mut R) -> Self {
        Self::new(
            (0..shard_count)
                .map(|_| ShardSeed::from_rng(&mut *rng))
                .collect(),
        )
    }

    /// Set the health flag of one shard without touching the offline set.
    pub fn set_health(&mut self, index: ShardIndex, healthy: bool) -> Result<(), RoutingError> {
        self.check(index)?;
        self.healthy[index] = healthy;
        Ok(())
    }

    /// Mark a shard offline. Offline shards are always unhealthy.
    pub fn set_offline(&mut self, index: ShardIndex) -> Result<(), RoutingError> {
        self.check(index)?;
        self.offline.insert(index);
        self.healthy[index] = false;
        Ok(())
    }

    /// Indices of all offline shards, ascending.
    pub fn offline(&self) -> &BTreeSet<ShardIndex> {
        &self.offline
    }

    fn check(&self, index: ShardIndex) -> Result<(), RoutingError> {
        if index < self.seeds.len() {
            Ok(())
        } else {
            Err(RoutingError::OutOfRange {
                index,
                shard_count: self.seeds.len(),
            })
        }
    }
}

impl Topology for StaticTopology {
    fn shard_count(&self) -> usize {
        self.seeds.len()
    }

    fn is_healthy(&self, index: ShardIndex) -> bool {
        self.healthy[index]
    }

    fn is_offline(&self, index: ShardIndex) -> bool {
        self.offline.contains(&index)
    }

    fn seed(&self, index: ShardIndex) -> &ShardSeed {
        &self.seeds[index]
    }
}
