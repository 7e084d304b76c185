//! End-to-end mission scenarios
//!
//! Small hand-built worlds whose outcome is known tick by tick.

use robot_mission_core_rs::{
    AgentConfig, Event, Heuristic, ItemPlacement, Position, ScenarioConfig, Simulation, Status,
    Tier, WasteKind,
};

fn green_pair_world() -> ScenarioConfig {
    ScenarioConfig {
        width: 9,
        height: 3,
        obstacles: vec![],
        disposal: Position::new(8, 1),
        items: vec![
            ItemPlacement {
                kind: WasteKind::Green,
                position: Position::new(1, 0),
            },
            ItemPlacement {
                kind: WasteKind::Green,
                position: Position::new(2, 0),
            },
        ],
        agents: vec![AgentConfig {
            tier: Tier::Green,
            position: Position::new(0, 0),
            heuristic: Heuristic::Closest,
            vision_radius: None,
            carrying: vec![],
        }],
        rng_seed: 12345,
        default_vision_radius: 1,
        handshake_timeout: 30,
        shuffle_agents: true,
    }
}

#[test]
fn test_green_agent_combines_then_drops_at_boundary() {
    let mut sim = Simulation::new(green_pair_world()).unwrap();

    // Phase 1: pick up both greens and combine.
    let mut combined = false;
    for _ in 0..10 {
        sim.tick().unwrap();
        let agent = sim.agent(0).unwrap();
        if agent.carried_of(WasteKind::Yellow) == 1 {
            assert_eq!(agent.carried_of(WasteKind::Green), 0);
            assert_eq!(agent.carried_count(), 1);
            combined = true;
            break;
        }
    }
    assert!(combined, "agent never produced a yellow item");
    assert_eq!(sim.event_log().events_of_type("Combined").len(), 1);

    // Phase 2: the yellow lands in the yellow pool on the boundary column.
    let mut dropped = false;
    for _ in 0..10 {
        sim.tick().unwrap();
        if sim.agent(0).unwrap().carried_count() == 0 {
            dropped = true;
            break;
        }
    }
    assert!(dropped, "agent never dropped its product");

    let yellow = sim.pools().pool(WasteKind::Yellow).snapshot();
    assert_eq!(yellow.len(), 1);
    assert_eq!(yellow[0].0.position.x, 2);
    assert_eq!(sim.counts().green, 0);
    assert_eq!(sim.pools().pool(WasteKind::Yellow).unclaimed_len(), 1);
}

#[test]
fn test_green_agent_never_carries_more_than_needed() {
    let mut config = green_pair_world();
    config.items.push(ItemPlacement {
        kind: WasteKind::Green,
        position: Position::new(0, 1),
    });
    let mut sim = Simulation::new(config).unwrap();

    for _ in 0..30 {
        sim.tick().unwrap();
        let agent = sim.agent(0).unwrap();
        assert!(agent.carried_of(WasteKind::Green) + agent.assigned().len() <= 2);
    }
}

#[test]
fn test_red_agent_disposes_and_wins() {
    let config = ScenarioConfig {
        width: 9,
        height: 3,
        obstacles: vec![],
        disposal: Position::new(8, 1),
        items: vec![ItemPlacement {
            kind: WasteKind::Red,
            position: Position::new(7, 1),
        }],
        agents: vec![AgentConfig {
            tier: Tier::Red,
            position: Position::new(6, 1),
            heuristic: Heuristic::SearchCost,
            vision_radius: None,
            carrying: vec![],
        }],
        rng_seed: 1,
        default_vision_radius: 1,
        handshake_timeout: 30,
        shuffle_agents: false,
    };
    let mut sim = Simulation::new(config).unwrap();
    assert_eq!(sim.status(), Status::Running);

    let summary = sim.run(50).unwrap();
    assert_eq!(summary.status, Status::Won);
    assert!(!summary.inconclusive);
    assert_eq!(summary.items_delivered, 1);
    assert_eq!(summary.remaining.total(), 0);
    assert!(summary.ticks <= 5);
    assert_eq!(summary.total_distance_moved, 2);

    let delivered: Vec<_> = sim
        .event_log()
        .events()
        .iter()
        .filter(|event| matches!(event, Event::Delivered { .. }))
        .collect();
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        sim.event_log().events_of_type("StatusChanged").len(),
        1,
        "status flips once, running to won"
    );
}

#[test]
fn test_full_chain_generated_world() {
    use robot_mission_core_rs::generation::{generate, GeneratorConfig};

    let config = GeneratorConfig {
        width: 12,
        height: 6,
        green_waste: 8,
        green_robots: 2,
        yellow_robots: 2,
        red_robots: 2,
        vision_radius: 2,
        seed: 77,
        ..GeneratorConfig::default()
    };
    let mut sim = Simulation::new(generate(&config).unwrap()).unwrap();
    let summary = sim.run(3_000).unwrap();

    // 8 greens make 4 yellows make 2 reds, unless a handoff stalls. Either
    // way the counters must add up.
    let remaining = summary.remaining;
    assert!(summary.items_delivered <= 2);
    assert_eq!(
        remaining.mass() + 4 * summary.items_delivered,
        8,
        "mass is conserved"
    );
    if summary.status == Status::Won {
        assert_eq!(summary.items_delivered, 2);
    }
}

#[test]
fn test_sealed_item_is_given_back_and_reachable_one_collected() {
    // (1,1) is walled in on every side. The agent sees it and the reachable
    // (3,2) at once; (0,3) only comes into view once it starts sweeping.
    let walls = [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)];
    let green = |x, y| ItemPlacement {
        kind: WasteKind::Green,
        position: Position::new(x, y),
    };
    let config = ScenarioConfig {
        width: 12,
        height: 4,
        obstacles: walls.iter().map(|&(x, y)| Position::new(x, y)).collect(),
        disposal: Position::new(11, 0),
        items: vec![green(1, 1), green(3, 2), green(0, 3)],
        agents: vec![AgentConfig {
            tier: Tier::Green,
            position: Position::new(3, 0),
            heuristic: Heuristic::SearchCost,
            vision_radius: Some(2),
            carrying: vec![],
        }],
        rng_seed: 3,
        default_vision_radius: 1,
        handshake_timeout: 30,
        shuffle_agents: false,
    };
    let mut sim = Simulation::new(config).unwrap();
    assert_eq!(sim.grid().obstacle_count(), walls.len());

    let sealed = sim
        .pools()
        .pool(WasteKind::Green)
        .items_at(Position::new(1, 1))[0]
        .id;

    for _ in 0..80 {
        sim.tick().unwrap();
        assert!(!sim.agent(0).unwrap().is_carrying(sealed));
    }

    let released_sealed = sim.event_log().events().iter().any(|event| {
        matches!(event, Event::Released { item_id, .. } if *item_id == sealed)
    });
    assert!(released_sealed, "the walled-in claim was never given back");

    assert_eq!(sim.event_log().events_of_type("Combined").len(), 1);
    assert_eq!(sim.counts().green, 1);
    let yellow = sim.pools().pool(WasteKind::Yellow).snapshot();
    assert_eq!(yellow.len(), 1);
    assert_eq!(yellow[0].0.position.x, 3);
}
