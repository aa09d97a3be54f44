//! TOML configuration for `vdiskd`.
//!
//! Every section is optional; missing values fall back to the defaults of
//! the reference scenario (10 shards, 1000 blocks).

use std::path::Path;

use serde::Deserialize;
use vdisk_routing::RoutingStrategy;
use vdisk_types::ShardIndex;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Vdisk topology and routing.
    pub vdisk: VdiskSection,
    /// Simulation workload.
    pub simulation: SimulationSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[vdisk]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VdiskSection {
    /// Number of shards. Must be positive.
    pub shard_count: usize,
    /// Routing strategy: `"modulo"`, `"rehash-modulo"` or `"jump-consistent"`.
    pub strategy: RoutingStrategy,
    /// RNG seed for shard seeds and block values. Random if omitted.
    pub seed: Option<u64>,
}

impl Default for VdiskSection {
    fn default() -> Self {
        Self {
            shard_count: 10,
            strategy: RoutingStrategy::default(),
            seed: None,
        }
    }
}

/// `[simulation]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Number of blocks written at addresses `0..blocks`.
    pub blocks: u64,
    /// Shards to fail, in order.
    pub fail: Vec<ShardIndex>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            blocks: 1_000,
            fail: Vec::new(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
