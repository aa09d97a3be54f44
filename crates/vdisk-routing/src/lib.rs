//! Deterministic routing of block addresses to vdisk shards.
//!
//! A [`RoutingStrategy`] is a pure function of a [`Topology`] (shard count,
//! per-shard health, offline set) and a block address. Three strategies are
//! provided, all sharing the same shape: the primary shard is
//! `address % shard_count`, and only addresses whose primary is unavailable
//! take the more expensive fallback path.
//!
//! - [`RoutingStrategy::Modulo`] — no fallback at all.
//! - [`RoutingStrategy::RehashModulo`] — `blake3(address ++ primary_seed)`
//!   picks a slot among the currently healthy shards.
//! - [`RoutingStrategy::JumpConsistent`] — [`jump_hash`] probing until a
//!   bucket outside the offline set is found.

mod error;
mod jump;
mod strategy;
mod topology;

pub use error::RoutingError;
pub use jump::jump_hash;
pub use strategy::RoutingStrategy;
pub use topology::{StaticTopology, Topology};
