//! The vdisk: an ordered set of shards behind a routing strategy.
//!
//! [`Vdisk`] resolves every block address through its [`RoutingStrategy`]
//! and forwards the operation to the owning [`Shard`]. When a shard is failed
//! with [`Vdisk::fail_shard`], its blocks are replayed through the normal
//! write path so the strategy can re-home each one.
//!
//! The engine is synchronous and holds no locks. Callers sharing a vdisk
//! across threads must serialize access themselves; [`Vdisk::clone`] gives
//! an independent copy for parallel experiments.
//!
//! [`RoutingStrategy`]: vdisk_routing::RoutingStrategy
//! [`Shard`]: vdisk_shard::Shard

pub mod error;
pub mod vdisk;

pub use error::VdiskError;
pub use vdisk::Vdisk;
