//! Write/fail/verify workload against a single vdisk.

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use vdisk_engine::{Vdisk, VdiskError};
use vdisk_routing::RoutingStrategy;
use vdisk_types::{ShardIndex, ShardReport};

/// Parameters of one simulation run.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub shard_count: usize,
    pub strategy: RoutingStrategy,
    /// Blocks are written at addresses `0..blocks`.
    pub blocks: u64,
    /// Shards to fail, in order, after all blocks are written.
    pub fail: Vec<ShardIndex>,
    /// Seed for shard seeds and block values. Random if `None`.
    pub seed: Option<u64>,
}

/// Result of failing one shard.
#[derive(Debug)]
pub struct FailOutcome {
    pub index: ShardIndex,
    pub result: Result<usize, VdiskError>,
}

/// What a simulation observed.
#[derive(Debug, Default)]
pub struct Outcome {
    pub failures: Vec<FailOutcome>,
    pub report: Vec<ShardReport>,
    /// Reads that returned the written value.
    pub verified: u64,
    /// Reads that returned a different value.
    pub mismatched: u64,
    pub missing: u64,
    pub unhealthy: u64,
    pub unroutable: u64,
}

impl Outcome {
    /// Whether every written block read back intact.
    pub fn is_clean(&self) -> bool {
        self.mismatched == 0 && self.missing == 0 && self.unhealthy == 0 && self.unroutable == 0
    }
}

/// Write random bytes, fail the configured shards, then read everything back.
pub fn run(sim: &Simulation) -> anyhow::Result<Outcome> {
    let mut rng = match sim.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut vdisk: Vdisk = Vdisk::with_rng(sim.shard_count, sim.strategy, &mut rng)
        .context("failed to create vdisk")?;

    let values: Vec<u8> = (0..sim.blocks).map(|_| rng.random()).collect();
    for (address, &value) in (0u64..).zip(&values) {
        vdisk
            .set_block(address, value)
            .with_context(|| format!("failed to write block {address}"))?;
    }
    info!(
        blocks = sim.blocks,
        shards = sim.shard_count,
        strategy = %sim.strategy,
        "vdisk populated"
    );

    let mut outcome = Outcome::default();

    for &index in &sim.fail {
        let result = vdisk.fail_shard(index);
        if let Err(e) = &result {
            warn!(index, error = %e, "shard failure left vdisk partially redistributed");
        }
        outcome.failures.push(FailOutcome { index, result });
    }

    for (address, &expected) in (0u64..).zip(&values) {
        match vdisk.get_block(address) {
            Ok(value) if value == expected => outcome.verified += 1,
            Ok(_) => outcome.mismatched += 1,
            Err(VdiskError::BlockNotFound(_)) => outcome.missing += 1,
            Err(VdiskError::ShardNotHealthy(_)) => outcome.unhealthy += 1,
            Err(VdiskError::ShardIndexNotFound(_) | VdiskError::NoShards) => {
                outcome.unroutable += 1
            }
        }
    }

    outcome.report = vdisk.report();
    Ok(outcome)
}
