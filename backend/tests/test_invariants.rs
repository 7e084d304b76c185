//! Property tests over generated worlds
//!
//! For arbitrary small scenarios, every tick must keep ownership exclusive,
//! conserve base-unit mass (minus what was disposed) and keep agents in
//! their regions. `Simulation::tick` already verifies the ledger; these
//! properties check the public view on top of that.

use proptest::prelude::*;
use robot_mission_core_rs::generation::{generate, GeneratorConfig};
use robot_mission_core_rs::{Heuristic, ItemId, Owner, Simulation};
use std::collections::HashSet;

fn heuristic_strategy() -> impl Strategy<Value = Heuristic> {
    prop::sample::select(Heuristic::ALL.to_vec())
}

prop_compose! {
    fn world_strategy()(
        width in 6i32..16,
        height in 3i32..10,
        green_waste in 0usize..12,
        yellow_waste in 0usize..5,
        red_waste in 0usize..3,
        green_robots in 1usize..4,
        yellow_robots in 0usize..3,
        red_robots in 0usize..3,
        walls in 0usize..10,
        heuristic in heuristic_strategy(),
        vision_radius in 0u32..3,
        handshake_timeout in 1u64..20,
        seed in any::<u64>(),
    ) -> GeneratorConfig {
        GeneratorConfig {
            width,
            height,
            green_waste,
            yellow_waste,
            red_waste,
            green_robots,
            yellow_robots,
            red_robots,
            walls,
            heuristic,
            vision_radius,
            handshake_timeout,
            seed,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_ownership_mass_and_confinement(config in world_strategy()) {
        let scenario = generate(&config).unwrap();
        let mut sim = Simulation::new(scenario).unwrap();
        let initial_mass = sim.counts().mass();

        for _ in 0..150 {
            let result = sim.tick();
            prop_assert!(result.is_ok(), "tick failed: {:?}", result.err());

            // Exclusivity across agents.
            let mut held: HashSet<ItemId> = HashSet::new();
            for agent in sim.agents() {
                for item in agent.assigned().iter().chain(agent.carrying()) {
                    prop_assert!(held.insert(item.id), "item {} held twice", item.id);
                }
                let zone = sim.zones().zone_of(agent.position());
                prop_assert!(agent.tier().allows(zone));
            }

            // Nothing held is still claimable from a pool.
            for pool in sim.pools().iter() {
                for (item, owner) in pool.snapshot() {
                    if owner == Owner::Pool {
                        prop_assert!(!held.contains(&item.id));
                    }
                }
            }

            prop_assert_eq!(
                sim.counts().mass() + 4 * sim.items_delivered(),
                initial_mass
            );
        }
    }

    #[test]
    fn prop_status_is_monotone_once_terminal(config in world_strategy()) {
        let mut sim = Simulation::new(generate(&config).unwrap()).unwrap();
        let summary = sim.run(400).unwrap();
        if summary.status.is_terminal() {
            // No future combine or delivery can flip a terminal verdict.
            for _ in 0..20 {
                let result = sim.tick().unwrap();
                prop_assert_eq!(result.status, summary.status);
            }
        } else {
            prop_assert!(summary.inconclusive);
            prop_assert_eq!(summary.ticks, 400);
        }
    }
}
