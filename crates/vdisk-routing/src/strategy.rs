//! The closed set of routing strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vdisk_types::{BlockAddress, ShardIndex};

use crate::error::RoutingError;
use crate::jump::jump_hash;
use crate::topology::Topology;

/// How a vdisk maps block addresses to shards.
///
/// Every strategy first tries the primary shard `address % shard_count`.
/// They differ only in what happens when that shard is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingStrategy {
    /// Always the primary shard, healthy or not.
    #[default]
    Modulo,
    /// Primary shard if healthy, otherwise a seeded rehash into the dense
    /// sequence of healthy shards.
    RehashModulo,
    /// Primary shard if not offline, otherwise a jump consistent hash probe
    /// over all shards that skips offline buckets.
    JumpConsistent,
}

impl RoutingStrategy {
    /// All strategies, in increasing order of sophistication.
    pub const ALL: [RoutingStrategy; 3] = [
        RoutingStrategy::Modulo,
        RoutingStrategy::RehashModulo,
        RoutingStrategy::JumpConsistent,
    ];

    /// Resolve the shard that owns `address` under `topology`.
    ///
    /// Deterministic: the same topology and address always give the same
    /// answer. An empty topology never routes.
    pub fn route<T: Topology + ?Sized>(
        &self,
        topology: &T,
        address: BlockAddress,
    ) -> Result<ShardIndex, RoutingError> {
        let shard_count = topology.shard_count();
        if shard_count == 0 {
            return Err(RoutingError::NoRoute { address });
        }

        let primary = (address % shard_count as u64) as ShardIndex;

        match self {
            RoutingStrategy::Modulo => Ok(primary),
            RoutingStrategy::RehashModulo => {
                if topology.is_healthy(primary) {
                    return Ok(primary);
                }
                rehash(topology, address, primary)
            }
            RoutingStrategy::JumpConsistent => {
                if !topology.is_offline(primary) {
                    return Ok(primary);
                }
                jump_probe(topology, address)
            }
        }
    }
}

/// Pick a healthy shard for an address whose primary is unhealthy.
///
/// The first byte of `blake3(address_le ++ primary_seed)` is reduced modulo
/// the healthy shard count and used as a position within the healthy shards
/// taken in index order.
fn rehash<T: Topology + ?Sized>(
    topology: &T,
    address: BlockAddress,
    primary: ShardIndex,
) -> Result<ShardIndex, RoutingError> {
    let healthy = topology.healthy_count();
    if healthy == 0 {
        return Err(RoutingError::NoRoute { address });
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(&address.to_le_bytes());
    hasher.update(topology.seed(primary).as_ref());
    let slot = hasher.finalize().as_bytes()[0] as usize % healthy;

    let target = (0..topology.shard_count())
        .filter(|&index| topology.is_healthy(index))
        .nth(slot)
        .ok_or(RoutingError::NoRoute { address })?;

    debug!(address, primary, target, "primary shard unhealthy, rehashed");
    Ok(target)
}

/// Probe jump hash buckets for `address`, `address + 1`, ... until one is not
/// offline. Gives up after `shard_count + 1` attempts.
fn jump_probe<T: Topology + ?Sized>(
    topology: &T,
    address: BlockAddress,
) -> Result<ShardIndex, RoutingError> {
    let shard_count = topology.shard_count();
    let mut key = address;

    for attempt in 0..=shard_count {
        let bucket = jump_hash(key, shard_count).ok_or(RoutingError::NoRoute { address })?;
        if !topology.is_offline(bucket) {
            debug!(address, bucket, attempt, "primary shard offline, jumped");
            return Ok(bucket);
        }
        key = key.wrapping_add(1);
    }

    Err(RoutingError::NoRoute { address })
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoutingStrategy::Modulo => "modulo",
            RoutingStrategy::RehashModulo => "rehash-modulo",
            RoutingStrategy::JumpConsistent => "jump-consistent",
        };
        f.pad(name)
    }
}

impl FromStr for RoutingStrategy {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoutingStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.to_string() == s.trim())
            .ok_or_else(|| RoutingError::UnknownStrategy(s.to_string()))
    }
}
