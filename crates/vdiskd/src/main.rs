//! `vdiskd` — drive the vdisk shard router from the command line.
//!
//! # Usage
//!
//! ```text
//! vdiskd simulate                                  # 10 shards, 1000 blocks, modulo
//! vdiskd simulate -s rehash-modulo --fail 6        # fail shard 6 and verify
//! vdiskd simulate -c vdisk.toml --seed 42          # reproducible run from a config file
//! vdiskd route 16 --offline 6                      # where does block 16 go?
//! ```

mod config;
mod simulate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use vdisk_routing::{RoutingStrategy, StaticTopology};
use vdisk_types::{BlockAddress, ShardIndex};

use config::CliConfig;
use simulate::Simulation;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "vdiskd", version, about = "Sharded vdisk routing simulator")]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the shard count.
    #[arg(short = 'n', long, global = true)]
    shards: Option<usize>,

    /// Override the RNG seed.
    #[arg(long, global = true, env = "VDISK_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write blocks, fail shards, and verify every block reads back.
    Simulate {
        /// Routing strategy: modulo, rehash-modulo or jump-consistent.
        #[arg(short, long)]
        strategy: Option<RoutingStrategy>,

        /// Number of blocks to write.
        #[arg(short, long)]
        blocks: Option<u64>,

        /// Shard(s) to fail after writing, in order.
        #[arg(short, long, value_delimiter = ',')]
        fail: Vec<ShardIndex>,
    },

    /// Show which shard a block address resolves to under each strategy.
    Route {
        /// Block address to resolve.
        address: BlockAddress,

        /// Shard(s) to mark offline first.
        #[arg(short, long, value_delimiter = ',')]
        offline: Vec<ShardIndex>,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    // CLI args override config file values.
    if let Some(n) = cli.shards {
        config.vdisk.shard_count = n;
    }
    if let Some(seed) = cli.seed {
        config.vdisk.seed = Some(seed);
    }

    match cli.command {
        Commands::Simulate {
            strategy,
            blocks,
            fail,
        } => {
            if let Some(s) = strategy {
                config.vdisk.strategy = s;
            }
            if let Some(b) = blocks {
                config.simulation.blocks = b;
            }
            if !fail.is_empty() {
                config.simulation.fail = fail;
            }
            cmd_simulate(&config)
        }
        Commands::Route { address, offline } => cmd_route(&config, address, &offline),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// -----------------------------------------------------------------------
// vdiskd simulate
// -----------------------------------------------------------------------

fn cmd_simulate(config: &CliConfig) -> Result<()> {
    let sim = Simulation {
        shard_count: config.vdisk.shard_count,
        strategy: config.vdisk.strategy,
        blocks: config.simulation.blocks,
        fail: config.simulation.fail.clone(),
        seed: config.vdisk.seed,
    };
    info!(?sim, "starting simulation");

    let outcome = simulate::run(&sim)?;

    println!("Vdisk simulation");
    println!("  shards:   {}", sim.shard_count);
    println!("  blocks:   {}", sim.blocks);
    println!("  strategy: {}", sim.strategy);
    println!();

    for failure in &outcome.failures {
        match &failure.result {
            Ok(moved) => println!("Failed shard {}: {moved} blocks redistributed", failure.index),
            Err(e) => println!("Failed shard {}: redistribution aborted ({e})", failure.index),
        }
    }

    println!();
    println!("Current vdisk state:");
    for report in &outcome.report {
        println!("  {report}");
    }

    println!();
    println!("Verification:");
    println!("  intact:      {}", outcome.verified);
    println!("  mismatched:  {}", outcome.mismatched);
    println!("  missing:     {}", outcome.missing);
    println!("  unhealthy:   {}", outcome.unhealthy);
    println!("  unroutable:  {}", outcome.unroutable);

    if !outcome.is_clean() {
        anyhow::bail!("{} blocks could not be read back", sim.blocks - outcome.verified);
    }
    Ok(())
}

// -----------------------------------------------------------------------
// vdiskd route
// -----------------------------------------------------------------------

fn cmd_route(config: &CliConfig, address: BlockAddress, offline: &[ShardIndex]) -> Result<()> {
    let mut rng = match config.vdisk.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut topology = StaticTopology::with_rng(config.vdisk.shard_count, &mut rng);
    for &index in offline {
        topology
            .set_offline(index)
            .with_context(|| format!("cannot take shard {index} offline"))?;
    }

    println!(
        "Block {address} over {} shards (offline: {offline:?})",
        config.vdisk.shard_count
    );
    for strategy in RoutingStrategy::ALL {
        match strategy.route(&topology, address) {
            Ok(index) => println!("  {strategy:<16} -> shard {index}"),
            Err(e) => println!("  {strategy:<16} -> {e}"),
        }
    }

    Ok(())
}
