// Invariant checks and config validation
//
// The ledger in the task pools must always agree with what agents hold;
// the only exception is a TRANSFER still on the bus.

use crate::models::{Message, MessageBody, Position, Tier, WasteKind};
use crate::orchestrator::engine::{
    AgentConfig, ItemPlacement, ScenarioConfig, Simulation, SimulationError,
};
use crate::policy::Heuristic;

fn agent(tier: Tier, x: i32, y: i32) -> AgentConfig {
    AgentConfig {
        tier,
        position: Position::new(x, y),
        heuristic: Heuristic::Closest,
        vision_radius: None,
        carrying: vec![],
    }
}

fn base_config() -> ScenarioConfig {
    ScenarioConfig {
        width: 9,
        height: 4,
        obstacles: vec![Position::new(4, 1)],
        disposal: Position::new(8, 2),
        items: vec![
            ItemPlacement {
                kind: WasteKind::Green,
                position: Position::new(1, 1),
            },
            ItemPlacement {
                kind: WasteKind::Yellow,
                position: Position::new(4, 3),
            },
        ],
        agents: vec![agent(Tier::Green, 0, 0), agent(Tier::Yellow, 3, 0)],
        rng_seed: 7,
        default_vision_radius: 1,
        handshake_timeout: 30,
        shuffle_agents: true,
    }
}

fn expect_invalid(config: ScenarioConfig) {
    match Simulation::new(config) {
        Err(SimulationError::InvalidConfig(_)) => {}
        other => panic!("expected InvalidConfig, got {:?}", other),
    }
}

#[test]
fn test_fresh_world_satisfies_invariants() {
    let sim = Simulation::new(base_config()).unwrap();
    assert!(sim.check_invariants().is_ok());
    assert_eq!(sim.counts().total(), 2);
}

#[test]
fn test_invariants_hold_across_ticks() {
    let mut sim = Simulation::new(base_config()).unwrap();
    for _ in 0..25 {
        sim.tick().unwrap();
        assert!(sim.check_invariants().is_ok());
    }
}

#[test]
fn test_orphan_claim_is_detected() {
    let sim = Simulation::new(base_config()).unwrap();
    let pool = sim.pools().pool(WasteKind::Green);
    pool.observe(Position::new(1, 1), 0);

    // Claimed in the ledger, but agent 0 never recorded it.
    let claimed = pool.claim(0, 1, |_| true, |_| {});
    assert_eq!(claimed.len(), 1);

    assert!(matches!(
        sim.check_invariants(),
        Err(SimulationError::InvariantViolation(_))
    ));
}

#[test]
fn test_in_flight_transfer_is_accounted_for() {
    let sim = Simulation::new(base_config()).unwrap();
    let item = sim
        .pools()
        .spawn_carried(WasteKind::Green, Position::new(0, 0), 0)
        .unwrap();

    // Carried by agent 0 in the ledger only: broken.
    assert!(sim.check_invariants().is_err());

    // Move it in the ledger and put the TRANSFER on the bus: consistent.
    sim.pools()
        .pool(WasteKind::Green)
        .transfer(0, 1, item.id)
        .unwrap();
    sim.bus().send(Message::direct(
        0,
        1,
        0,
        MessageBody::Transfer { items: vec![item] },
    ));
    assert!(sim.check_invariants().is_ok());
}

#[test]
fn test_rejects_narrow_grid() {
    let mut config = base_config();
    config.width = 2;
    config.disposal = Position::new(1, 0);
    config.items.clear();
    config.agents = vec![agent(Tier::Red, 0, 0)];
    expect_invalid(config);
}

#[test]
fn test_rejects_disposal_off_eastern_column() {
    let mut config = base_config();
    config.disposal = Position::new(7, 2);
    expect_invalid(config);
}

#[test]
fn test_rejects_disposal_on_obstacle() {
    let mut config = base_config();
    config.obstacles.push(config.disposal);
    expect_invalid(config);
}

#[test]
fn test_rejects_agent_outside_region() {
    let mut config = base_config();
    config.agents.push(agent(Tier::Green, 5, 0));
    expect_invalid(config);
}

#[test]
fn test_rejects_item_outside_collector_region() {
    let mut config = base_config();
    config.items.push(ItemPlacement {
        kind: WasteKind::Green,
        position: Position::new(6, 0),
    });
    expect_invalid(config);
}

#[test]
fn test_rejects_item_on_obstacle() {
    let mut config = base_config();
    config.items.push(ItemPlacement {
        kind: WasteKind::Yellow,
        position: Position::new(4, 1),
    });
    expect_invalid(config);
}

#[test]
fn test_rejects_wrong_starting_inventory() {
    let mut config = base_config();
    config.agents[0].carrying = vec![WasteKind::Yellow];
    expect_invalid(config.clone());

    config.agents[0].carrying = vec![WasteKind::Green; 3];
    expect_invalid(config);
}

#[test]
fn test_rejects_empty_roster_and_zero_timeout() {
    let mut config = base_config();
    config.agents.clear();
    expect_invalid(config);

    let mut config = base_config();
    config.handshake_timeout = 0;
    expect_invalid(config);
}

#[test]
fn test_starting_inventory_is_carried() {
    let mut config = base_config();
    config.agents[0].carrying = vec![WasteKind::Green];
    let sim = Simulation::new(config).unwrap();

    let agent = sim.agent(0).unwrap();
    assert_eq!(agent.carried_of(WasteKind::Green), 1);
    assert!(sim.check_invariants().is_ok());
    assert_eq!(sim.counts().green, 2);
}
