//! Integration test: how many blocks move when a shard fails.
//!
//! The failure-aware strategies only move blocks that lived on the failed
//! shard. Everything else keeps its owner.

use vdisk_engine::Vdisk;
use vdisk_integration_tests::populated;
use vdisk_routing::RoutingStrategy;
use vdisk_types::ShardIndex;

fn owners(vdisk: &Vdisk, blocks: u64) -> Vec<ShardIndex> {
    (0..blocks).map(|a| vdisk.route(a).unwrap()).collect()
}

fn assert_only_failed_shard_moves(strategy: RoutingStrategy) {
    let blocks = 10_000;
    let (mut vdisk, _) = populated(10, blocks, strategy, 7);
    let before = owners(&vdisk, blocks);

    vdisk.fail_shard(4).unwrap();
    let after = owners(&vdisk, blocks);

    let mut moved = 0;
    for (address, (b, a)) in before.iter().zip(&after).enumerate() {
        if *b == 4 {
            assert_ne!(*a, 4, "{strategy}: block {address} still on failed shard");
            moved += 1;
        } else {
            assert_eq!(b, a, "{strategy}: block {address} moved from healthy shard {b}");
        }
    }

    // ~1/10 of the blocks move, no more.
    assert_eq!(moved, 1_000, "{strategy}");
}

#[test]
fn test_rehash_moves_only_failed_shard() {
    assert_only_failed_shard_moves(RoutingStrategy::RehashModulo);
}

#[test]
fn test_jump_moves_only_failed_shard() {
    assert_only_failed_shard_moves(RoutingStrategy::JumpConsistent);
}

/// Re-homed blocks are spread over the survivors rather than piled onto one.
#[test]
fn test_failed_shard_spreads_over_survivors() {
    for strategy in [RoutingStrategy::RehashModulo, RoutingStrategy::JumpConsistent] {
        let (mut vdisk, _) = populated(10, 10_000, strategy, 8);
        let before: Vec<usize> = vdisk.report().iter().map(|r| r.block_count).collect();

        vdisk.fail_shard(4).unwrap();

        for report in vdisk.report() {
            if report.index == 4 {
                continue;
            }
            let gained = report.block_count - before[report.index];
            assert!(
                (30..=250).contains(&gained),
                "{strategy}: shard {} gained {gained} of 1000 blocks",
                report.index
            );
        }
    }
}

/// Two vdisks with different strategies coexist without interfering.
#[test]
fn test_strategies_are_per_vdisk() {
    let (mut rehash, values) = populated(10, 1_000, RoutingStrategy::RehashModulo, 9);
    let (mut modulo, _) = populated(10, 1_000, RoutingStrategy::Modulo, 9);

    rehash.fail_shard(1).unwrap();
    assert!(modulo.fail_shard(1).is_err());

    assert_eq!(rehash.get_block(11), Ok(values[11]));
    assert!(modulo.get_block(11).is_err());
    assert_eq!(rehash.strategy(), RoutingStrategy::RehashModulo);
    assert_eq!(modulo.strategy(), RoutingStrategy::Modulo);
}
