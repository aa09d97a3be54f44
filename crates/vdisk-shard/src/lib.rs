//! A single vdisk shard: a health-flagged map of block addresses to
//! fixed-size values.
//!
//! - [`Shard`] — the block map, its health flag and its routing seed.
//! - [`ShardError`] — failures reported by shard lookups.
//!
//! A shard never consults its own health flag. Health is enforced by the
//! vdisk that owns the shard.

mod error;
mod shard;

pub use error::ShardError;
pub use shard::Shard;
