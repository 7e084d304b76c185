//! Scenario generation
//!
//! Builds a random but zone-consistent [`ScenarioConfig`] from a handful of
//! counts. The layout follows the classic mission setup:
//!
//! - disposal cell on a random row of the eastern column
//! - green waste in z1, yellow waste in z2, red waste in z3
//! - green robots in z1, yellow robots in z1 or z2, red robots anywhere
//! - optional wall cells that never cover the disposal cell, waste or robots
//!
//! Everything is drawn from one [`RngManager`], so a seed fixes the world.
//!
//! # Example
//!
//! ```rust
//! use robot_mission_core_rs::generation::{generate, GeneratorConfig};
//!
//! let config = GeneratorConfig { seed: 9, ..GeneratorConfig::default() };
//! let scenario = generate(&config).unwrap();
//! assert_eq!(scenario, generate(&config).unwrap());
//! assert_eq!(scenario.disposal.x, config.width - 1);
//! ```

use crate::models::{Position, Tier, WasteKind, Zone, ZoneMap};
use crate::orchestrator::{AgentConfig, ItemPlacement, ScenarioConfig, Simulation, SimulationError};
use crate::policy::Heuristic;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Knobs for [`generate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: i32,
    pub height: i32,

    pub green_waste: usize,
    pub yellow_waste: usize,
    pub red_waste: usize,

    pub green_robots: usize,
    pub yellow_robots: usize,
    pub red_robots: usize,

    /// Wall cells to scatter; fewer are placed if the grid runs out of room
    pub walls: usize,

    /// Claim heuristic for every robot
    pub heuristic: Heuristic,
    pub vision_radius: u32,
    pub handshake_timeout: u64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 9,
            height: 6,
            green_waste: 8,
            yellow_waste: 0,
            red_waste: 0,
            green_robots: 2,
            yellow_robots: 1,
            red_robots: 1,
            walls: 0,
            heuristic: Heuristic::Closest,
            vision_radius: 1,
            handshake_timeout: 30,
            seed: 42,
        }
    }
}

/// Random cell whose zone satisfies `allowed`.
fn random_cell(
    rng: &mut RngManager,
    zones: &ZoneMap,
    height: i32,
    allowed: &[Zone],
) -> Position {
    let first = allowed.iter().map(|z| zones.western_edge(*z)).min().unwrap_or(0);
    let last = allowed
        .iter()
        .map(|z| zones.eastern_edge(*z))
        .max()
        .unwrap_or(first);
    // Allowed zone sets are contiguous column bands starting at z1 or a single zone.
    let span = (last - first + 1).max(1) as usize;
    let x = first + rng.below(span) as i32;
    let y = rng.below(height.max(1) as usize) as i32;
    Position::new(x, y)
}

/// Generate a scenario and validate it.
///
/// # Returns
///
/// * `Ok(ScenarioConfig)` - A scenario that [`Simulation::new`] accepts
/// * `Err(SimulationError::InvalidConfig)` - The knobs describe no valid world
pub fn generate(config: &GeneratorConfig) -> Result<ScenarioConfig, SimulationError> {
    if config.width < 3 || config.height < 1 {
        return Err(SimulationError::InvalidConfig(format!(
            "cannot generate a {}x{} grid",
            config.width, config.height
        )));
    }
    let robots = config.green_robots + config.yellow_robots + config.red_robots;
    if robots == 0 {
        return Err(SimulationError::InvalidConfig(
            "Must have at least one agent".to_string(),
        ));
    }

    let mut rng = RngManager::new(config.seed);
    let zones = ZoneMap::new(config.width);
    let height = config.height;

    let disposal = Position::new(config.width - 1, rng.below(height as usize) as i32);

    let mut items = Vec::new();
    let waste = [
        (WasteKind::Green, Zone::Z1, config.green_waste),
        (WasteKind::Yellow, Zone::Z2, config.yellow_waste),
        (WasteKind::Red, Zone::Z3, config.red_waste),
    ];
    for (kind, zone, count) in waste {
        for _ in 0..count {
            items.push(ItemPlacement {
                kind,
                position: random_cell(&mut rng, &zones, height, &[zone]),
            });
        }
    }

    let mut agents = Vec::with_capacity(robots);
    let roster = [
        (Tier::Green, config.green_robots),
        (Tier::Yellow, config.yellow_robots),
        (Tier::Red, config.red_robots),
    ];
    for (tier, count) in roster {
        for _ in 0..count {
            agents.push(AgentConfig {
                tier,
                position: random_cell(&mut rng, &zones, height, tier.allowed_zones()),
                heuristic: config.heuristic,
                vision_radius: None,
                carrying: vec![],
            });
        }
    }

    let mut taken: HashSet<Position> = items.iter().map(|item| item.position).collect();
    taken.extend(agents.iter().map(|agent| agent.position));
    taken.insert(disposal);

    let mut free: Vec<Position> = (0..config.width)
        .flat_map(|x| (0..height).map(move |y| Position::new(x, y)))
        .filter(|pos| !taken.contains(pos))
        .collect();
    rng.shuffle(&mut free);
    free.truncate(config.walls);
    let mut obstacles = free;
    obstacles.sort();

    let scenario = ScenarioConfig {
        width: config.width,
        height,
        obstacles,
        disposal,
        items,
        agents,
        rng_seed: rng.next(),
        default_vision_radius: config.vision_radius,
        handshake_timeout: config.handshake_timeout,
        shuffle_agents: true,
    };

    // Surface any inconsistency now rather than at simulation start.
    Simulation::validate_config(&scenario)?;
    Ok(scenario)
}
