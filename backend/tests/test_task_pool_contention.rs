//! Concurrency tests for the shared task pools
//!
//! Pools are shared by reference between agents; every ownership change
//! happens inside one critical section, so racing agents can never end up
//! holding the same item.

use robot_mission_core_rs::{AgentId, ItemId, Owner, Position, TaskPools, WasteKind};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const AGENTS: usize = 8;

fn seeded_pools(count: i32) -> TaskPools {
    let pools = TaskPools::new();
    for i in 0..count {
        pools
            .spawn(WasteKind::Green, Position::new(i % 3, i / 3))
            .unwrap();
    }
    // Everything visible.
    pools.pool(WasteKind::Green).observe(Position::new(1, 0), 100);
    pools
}

#[test]
fn test_concurrent_claims_are_disjoint() {
    let pools = Arc::new(seeded_pools(60));
    let barrier = Arc::new(Barrier::new(AGENTS));

    let handles: Vec<_> = (0..AGENTS)
        .map(|agent| {
            let pools = Arc::clone(&pools);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut mine = Vec::new();
                loop {
                    let batch = pools.pool(WasteKind::Green).claim(
                        agent as AgentId,
                        2,
                        |_| true,
                        |_| {},
                    );
                    if batch.is_empty() {
                        break;
                    }
                    mine.extend(batch.into_iter().map(|item| item.id));
                }
                mine
            })
        })
        .collect();

    let mut all: HashSet<ItemId> = HashSet::new();
    let mut total = 0;
    for handle in handles {
        let claimed = handle.join().unwrap();
        total += claimed.len();
        all.extend(claimed);
    }

    assert_eq!(total, 60, "every item claimed exactly once");
    assert_eq!(all.len(), 60);
    assert_eq!(pools.pool(WasteKind::Green).unclaimed_len(), 0);
}

#[test]
fn test_release_and_reclaim_churn_conserves_items() {
    let pools = Arc::new(seeded_pools(30));
    let barrier = Arc::new(Barrier::new(AGENTS));

    let handles: Vec<_> = (0..AGENTS)
        .map(|agent| {
            let pools = Arc::clone(&pools);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let id = agent as AgentId;
                barrier.wait();
                for _ in 0..200 {
                    let pool = pools.pool(WasteKind::Green);
                    for item in pool.claim(id, 3, |_| true, |_| {}) {
                        pool.release(id, item.id).unwrap();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let pool = pools.pool(WasteKind::Green);
    assert_eq!(pool.len(), 30);
    assert_eq!(pool.unclaimed_len(), 30);
    assert!(pool
        .snapshot()
        .iter()
        .all(|(_, owner)| *owner == Owner::Pool));
}

#[test]
fn test_only_the_claimant_can_pick_up() {
    let pools = Arc::new(seeded_pools(1));
    let item = pools
        .pool(WasteKind::Green)
        .claim(0, 1, |_| true, |_| {})
        .pop()
        .unwrap();

    let barrier = Arc::new(Barrier::new(AGENTS));
    let handles: Vec<_> = (0..AGENTS)
        .map(|agent| {
            let pools = Arc::clone(&pools);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                pools
                    .pool(WasteKind::Green)
                    .pick_up(agent as AgentId, item.id, item.position)
                    .is_ok()
            })
        })
        .collect();

    let winners: Vec<usize> = handles
        .into_iter()
        .enumerate()
        .filter_map(|(agent, handle)| handle.join().unwrap().then_some(agent))
        .collect();
    assert_eq!(winners, vec![0]);
    assert_eq!(
        pools.pool(WasteKind::Green).owner_of(item.id),
        Some(Owner::Carried(0))
    );
}

#[test]
fn test_unseen_items_are_not_claimable() {
    let pools = TaskPools::new();
    let near = pools.spawn(WasteKind::Green, Position::new(0, 0)).unwrap();
    let far = pools.spawn(WasteKind::Green, Position::new(2, 5)).unwrap();

    let pool = pools.pool(WasteKind::Green);
    assert!(pool.claim(0, 2, |_| true, |_| {}).is_empty());

    pool.observe(Position::new(0, 0), 1);
    let claimed = pool.claim(0, 2, |_| true, |_| {});
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, near.id);
    assert_eq!(pool.owner_of(far.id), Some(Owner::Pool));
}
