//! Shared types and identifiers for the vdisk shard router.
//!
//! This crate defines the core types used across the workspace:
//! addressing ([`BlockAddress`], [`ShardIndex`]), the per-shard routing
//! seed ([`ShardSeed`]) and the read-only reporting view ([`ShardReport`]).

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Logical block address within a vdisk's flat address space.
pub type BlockAddress = u64;

/// Position of a shard within a vdisk. This is the shard's permanent identity.
pub type ShardIndex = usize;

// ---------------------------------------------------------------------------
// Shard seed
// ---------------------------------------------------------------------------

/// Length of a [`ShardSeed`] in bytes.
pub const SEED_LEN: usize = 16;

/// Opaque per-shard seed used to diversify hash-based routing.
///
/// Generated once when the shard is created and never changed afterwards.
/// Two shards with different seeds produce different rehash sequences for
/// the same block address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ShardSeed([u8; SEED_LEN]);

impl ShardSeed {
    /// Draw a fresh seed from the thread-local RNG.
    pub fn random() -> Self {
        Self::from_rng(&mut rand::rng())
    }

    /// Draw a seed from the given RNG.
    pub fn from_rng<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SEED_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Return the raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl From<[u8; SEED_LEN]> for ShardSeed {
    fn from(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for ShardSeed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ShardSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ShardSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShardSeed({self})")
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Read-only snapshot of one shard's health and occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardReport {
    /// Position of the shard in its vdisk.
    pub index: ShardIndex,
    /// Whether the shard may serve reads and writes.
    pub healthy: bool,
    /// Whether the shard was explicitly failed.
    pub offline: bool,
    /// Number of addresses currently stored on the shard.
    pub block_count: usize,
}

impl fmt::Display for ShardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let health = if self.healthy { "healthy" } else { "unhealthy" };
        write!(
            f,
            "shard {} is {health} and has {} blocks",
            self.index, self.block_count
        )?;
        if self.offline {
            write!(f, " (offline)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
