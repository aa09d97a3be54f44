//! Integration test: shard failure and redistribution.
//!
//! Populate a vdisk, fail shards, and verify that every value survives the
//! replay through the routing strategy.

use vdisk_engine::VdiskError;
use vdisk_integration_tests::{assert_readable, assert_topology_consistent, populated};
use vdisk_routing::RoutingStrategy;

/// 10 shards, 1000 random bytes, rehash modulo, fail shard 6.
/// Every value reads back and nothing answers ShardNotHealthy.
#[test]
#[ntest::timeout(30000)]
fn test_rehash_fail_shard_6_reads_back_everything() {
    let (mut vdisk, values) = populated(10, 1_000, RoutingStrategy::RehashModulo, 1);

    vdisk.fail_shard(6).unwrap();

    for (address, &expected) in (0u64..).zip(&values) {
        let got = vdisk.get_block(address);
        assert_ne!(got, Err(VdiskError::ShardNotHealthy(6)));
        assert_eq!(got, Ok(expected), "address {address}");
    }
    assert_topology_consistent(&vdisk, 0..1_000);
}

/// The same scenario holds for any seed.
#[test]
#[ntest::timeout(30000)]
fn test_rehash_single_failure_many_seeds() {
    for seed in 0..20 {
        let (mut vdisk, values) = populated(10, 1_000, RoutingStrategy::RehashModulo, seed);
        let failed = (seed % 10) as usize;
        vdisk.fail_shard(failed).unwrap();
        assert_readable(&vdisk, &values);
    }
}

/// Jump consistent: block 16 has primary 6; with 6 offline it resolves to a
/// fixed shard in {0..9} \ {6}.
#[test]
fn test_jump_block_16_with_shard_6_offline() {
    let (mut vdisk, values) = populated(10, 1_000, RoutingStrategy::JumpConsistent, 2);
    vdisk.fail_shard(6).unwrap();

    let target = vdisk.route(16).unwrap();
    assert!(target < 10 && target != 6);
    for _ in 0..100 {
        assert_eq!(vdisk.route(16), Ok(target));
    }
    assert_eq!(vdisk.get_block(16), Ok(values[16]));
    assert_eq!(vdisk.shard(target).unwrap().get_block(16), Ok(values[16]));
}

/// Jump consistent keeps every value through a chain of failures.
#[test]
#[ntest::timeout(30000)]
fn test_jump_chain_of_failures() {
    let (mut vdisk, values) = populated(16, 4_000, RoutingStrategy::JumpConsistent, 3);

    for index in [3, 11, 7] {
        vdisk.fail_shard(index).unwrap();
        assert_readable(&vdisk, &values);
        assert_topology_consistent(&vdisk, 0..4_000);
    }
}

/// Failing twice changes nothing the second time.
#[test]
fn test_fail_twice_same_topology() {
    for strategy in [RoutingStrategy::RehashModulo, RoutingStrategy::JumpConsistent] {
        let (mut vdisk, values) = populated(10, 1_000, strategy, 4);
        vdisk.fail_shard(5).unwrap();
        let report = vdisk.report();

        assert_eq!(vdisk.fail_shard(5), Ok(0));
        assert_eq!(vdisk.report(), report);
        assert_readable(&vdisk, &values);
    }
}

/// Redistribution into a single survivor, then failing it too: the replay
/// aborts on its first block and the shard still goes offline.
#[test]
fn test_failing_last_survivor_aborts_replay() {
    let (mut vdisk, _) = populated(3, 30, RoutingStrategy::RehashModulo, 5);
    vdisk.fail_shard(0).unwrap();
    vdisk.fail_shard(1).unwrap();
    assert_eq!(vdisk.healthy_shards(), 1);
    assert_eq!(vdisk.shard(2).unwrap().block_count(), 30);

    let err = vdisk.fail_shard(2).unwrap_err();
    assert!(matches!(err, VdiskError::ShardIndexNotFound(_)), "{err}");

    // Shard 2 is offline even though its blocks had nowhere to go.
    assert_eq!(vdisk.healthy_shards(), 0);
    assert!(vdisk.offline_shards().contains(&2));
    assert_eq!(vdisk.shard(2).unwrap().block_count(), 30);
    assert!(vdisk.get_block(0).is_err());
}

/// Jump consistent over 4 shards with 0 and 1 offline: failing shard 2 moves
/// some blocks to shard 3 before a probe runs out of live buckets. The moved
/// blocks stay on shard 3 and keep reading back.
#[test]
fn test_partial_redistribution_is_not_rolled_back() {
    let (mut vdisk, values) = populated(4, 400, RoutingStrategy::JumpConsistent, 0);
    // With half the buckets offline these may exhaust a probe too; only the
    // resulting topology matters here.
    let _ = vdisk.fail_shard(0);
    let _ = vdisk.fail_shard(1);
    assert_eq!(vdisk.healthy_shards(), 2);

    let pending = vdisk.shard(2).unwrap().snapshot();
    let survivor_before = vdisk.shard(3).unwrap().block_count();
    let already_on_survivor: Vec<u64> = pending
        .iter()
        .map(|&(address, _)| address)
        .filter(|&address| vdisk.shard(3).unwrap().contains(address))
        .collect();

    let err = vdisk.fail_shard(2).unwrap_err();
    assert!(matches!(err, VdiskError::ShardIndexNotFound(_)), "{err}");

    let survivor = vdisk.shard(3).unwrap();
    assert!(
        survivor.block_count() > survivor_before,
        "no block moved before the abort"
    );

    let moved: Vec<u64> = pending
        .iter()
        .map(|&(address, _)| address)
        .filter(|&address| {
            survivor.contains(address) && !already_on_survivor.contains(&address)
        })
        .collect();
    assert_eq!(moved.len(), survivor.block_count() - survivor_before);
    for address in moved {
        assert_eq!(vdisk.route(address), Ok(3), "address {address}");
        assert_eq!(vdisk.get_block(address), Ok(values[address as usize]));
    }

    assert!(vdisk.offline_shards().contains(&2));
    assert!(!vdisk.shard(2).unwrap().is_healthy());
    assert_eq!(vdisk.healthy_shards(), 1);
    assert_eq!(vdisk.shard(2).unwrap().block_count(), pending.len());
}
