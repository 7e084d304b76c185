//! Simulation Engine
//!
//! Main loop integrating all components:
//! - World setup from a validated [`ScenarioConfig`]
//! - Per-agent decision procedure (see `behavior`)
//! - Shared coordination state (task pools, seen-set, message bus)
//! - Invariant checks and the termination oracle
//! - Event logging (complete simulation history)
//!
//! # Architecture
//!
//! ```text
//! For each tick t:
//! 1. Draw this tick's agent order (seeded shuffle)
//! 2. Each agent takes one turn; its moves are visible to later agents
//! 3. Advance time
//! 4. Check ownership and confinement invariants
//! 5. Evaluate the termination oracle
//! ```
//!
//! A tick always runs when asked; only [`Simulation::run`] stops at a
//! terminal status.
//!
//! # Example
//!
//! ```rust
//! use robot_mission_core_rs::{AgentConfig, Heuristic, ItemPlacement, Position, ScenarioConfig, Simulation, Status, Tier, WasteKind};
//!
//! let config = ScenarioConfig {
//!     width: 9,
//!     height: 3,
//!     obstacles: vec![],
//!     disposal: Position::new(8, 1),
//!     items: vec![
//!         ItemPlacement { kind: WasteKind::Green, position: Position::new(1, 0) },
//!         ItemPlacement { kind: WasteKind::Green, position: Position::new(2, 0) },
//!     ],
//!     agents: vec![AgentConfig {
//!         tier: Tier::Green,
//!         position: Position::new(0, 0),
//!         heuristic: Heuristic::Closest,
//!         vision_radius: Some(2),
//!         carrying: vec![],
//!     }],
//!     rng_seed: 12345,
//!     default_vision_radius: 1,
//!     handshake_timeout: 30,
//!     shuffle_agents: true,
//! };
//!
//! let mut sim = Simulation::new(config).unwrap();
//! for _ in 0..10 {
//!     sim.tick().unwrap();
//! }
//! // Two greens can never become a red, but the agent still does its job:
//! // the pair is combined and the yellow dropped at the zone boundary.
//! assert_eq!(sim.status(), Status::Lost);
//! assert_eq!(sim.counts().green, 0);
//! assert_eq!(sim.counts().yellow, 1);
//! ```

use crate::behavior::{AgentAction, TurnContext};
use crate::coordination::{MessageBus, PoolError, TaskPools};
use crate::core::time::TimeManager;
use crate::models::{
    Agent, AgentId, Event, EventLog, Grid, ItemCounts, ItemId, MessageBody, MoveError, Owner,
    Position, Tier, WasteItem, WasteKind, ZoneMap,
};
use crate::orchestrator::summary::{compute_config_hash, RunSummary};
use crate::orchestrator::termination::{self, Status};
use crate::policy::{build_ranking, ClaimRanking, Heuristic};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Configuration Types
// ============================================================================

fn default_vision_radius() -> u32 {
    1
}

fn default_handshake_timeout() -> u64 {
    30
}

fn default_shuffle_agents() -> bool {
    true
}

/// Complete scenario description
///
/// Produced by the world generator or loaded from JSON. Agent ids are roster
/// indices: the first agent is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub width: i32,
    pub height: i32,

    #[serde(default)]
    pub obstacles: Vec<Position>,

    /// Must lie on the eastern column
    pub disposal: Position,

    #[serde(default)]
    pub items: Vec<ItemPlacement>,

    pub agents: Vec<AgentConfig>,

    /// Seed for turn order and random rankings
    #[serde(default)]
    pub rng_seed: u64,

    /// Vision radius for agents that do not set their own
    #[serde(default = "default_vision_radius")]
    pub default_vision_radius: u32,

    /// Ticks a committed handshake may stay open before it is abandoned
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout: u64,

    /// Shuffle agent order every tick
    #[serde(default = "default_shuffle_agents")]
    pub shuffle_agents: bool,
}

/// Initial waste item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub kind: WasteKind,
    pub position: Position,
}

/// Per-agent configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub tier: Tier,
    pub position: Position,

    #[serde(default)]
    pub heuristic: Heuristic,

    /// Overrides the scenario default
    #[serde(default)]
    pub vision_radius: Option<u32>,

    /// Input items already held at start
    #[serde(default)]
    pub carrying: Vec<WasteKind>,
}

// ============================================================================
// Simulation
// ============================================================================

/// Owns the world and runs the tick loop
///
/// # Determinism
///
/// All randomness is drawn from `rng` (seeded xorshift64*): the per-tick
/// agent order and the seeds of random rankings. Same config, same events.
pub struct Simulation {
    grid: Grid,
    zones: ZoneMap,
    pools: TaskPools,
    bus: MessageBus,

    /// Indexed by agent id
    agents: Vec<Agent>,

    /// Per-agent claim rankings
    rankings: HashMap<AgentId, Box<dyn ClaimRanking>>,

    time: TimeManager,
    rng: RngManager,
    event_log: EventLog,

    status: Status,
    items_delivered: u64,
    transfers: u64,

    handshake_timeout: u64,
    shuffle_agents: bool,
    seed: u64,
    fingerprint: String,
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Tick number (0-based)
    pub tick: u64,

    /// Branch each agent took, in turn order
    pub actions: Vec<(AgentId, AgentAction)>,

    /// Cells moved by all agents this tick
    pub moves: usize,

    /// Items disposed this tick
    pub deliveries: u64,

    /// TRANSFER messages sent this tick
    pub transfers: u64,

    /// Live counts after the tick
    pub counts: ItemCounts,

    /// Oracle verdict after the tick
    pub status: Status,
}

/// Everything on one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellContents {
    pub agents: Vec<AgentId>,
    pub items: Vec<WasteItem>,
    pub obstacle: bool,
    pub disposal: bool,
}

/// Simulation error types
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Configuration validation error
    InvalidConfig(String),

    /// Agent not found
    AgentNotFound(AgentId),

    /// Ownership or confinement invariant broken
    InvariantViolation(String),

    /// Task pool refused an ownership change
    PoolError(PoolError),

    /// Grid refused a move
    MoveError(MoveError),

    /// Config could not be serialized
    SerializationError(String),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            SimulationError::AgentNotFound(id) => write!(f, "Agent not found: {}", id),
            SimulationError::InvariantViolation(msg) => {
                write!(f, "Invariant violation: {}", msg)
            }
            SimulationError::PoolError(err) => write!(f, "Task pool error: {}", err),
            SimulationError::MoveError(err) => write!(f, "Move error: {}", err),
            SimulationError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<PoolError> for SimulationError {
    fn from(err: PoolError) -> Self {
        SimulationError::PoolError(err)
    }
}

impl From<MoveError> for SimulationError {
    fn from(err: MoveError) -> Self {
        SimulationError::MoveError(err)
    }
}

impl Simulation {
    /// Build the world from a scenario
    ///
    /// # Returns
    ///
    /// * `Ok(Simulation)` - World ready at tick 0
    /// * `Err(SimulationError)` - Configuration validation failed
    pub fn new(config: ScenarioConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;
        let fingerprint = compute_config_hash(&config)?;

        let mut grid = Grid::new(
            config.width,
            config.height,
            config.obstacles.iter().copied(),
            config.disposal,
        );
        let zones = ZoneMap::new(config.width);
        let pools = TaskPools::new();
        for placement in &config.items {
            pools.spawn(placement.kind, placement.position)?;
        }

        let mut rng = RngManager::new(config.rng_seed);
        let mut agents = Vec::with_capacity(config.agents.len());
        let mut rankings: HashMap<AgentId, Box<dyn ClaimRanking>> = HashMap::new();

        for (index, agent_config) in config.agents.iter().enumerate() {
            let id = index as AgentId;
            grid.place_agent(id, agent_config.position)?;

            let mut agent = Agent::new(
                id,
                agent_config.tier,
                agent_config.position,
                agent_config.heuristic,
                agent_config
                    .vision_radius
                    .unwrap_or(config.default_vision_radius),
            );
            for kind in &agent_config.carrying {
                let item = pools.spawn_carried(*kind, agent_config.position, id)?;
                agent.carrying.push(item);
            }

            let ranking_seed = rng.fork(u64::from(id)).next();
            rankings.insert(id, build_ranking(agent_config.heuristic, ranking_seed));
            agents.push(agent);
        }

        let status = termination::evaluate(&pools.counts());

        Ok(Self {
            grid,
            zones,
            pools,
            bus: MessageBus::new(),
            agents,
            rankings,
            time: TimeManager::new(),
            rng,
            event_log: EventLog::new(),
            status,
            items_delivered: 0,
            transfers: 0,
            handshake_timeout: config.handshake_timeout,
            shuffle_agents: config.shuffle_agents,
            seed: config.rng_seed,
            fingerprint,
        })
    }

    /// Validate scenario configuration
    pub(crate) fn validate_config(config: &ScenarioConfig) -> Result<(), SimulationError> {
        if config.width < 3 {
            return Err(SimulationError::InvalidConfig(
                "width must be at least 3 (one column per zone)".to_string(),
            ));
        }
        if config.height < 1 {
            return Err(SimulationError::InvalidConfig(
                "height must be positive".to_string(),
            ));
        }
        if config.agents.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Must have at least one agent".to_string(),
            ));
        }
        if config.handshake_timeout == 0 {
            return Err(SimulationError::InvalidConfig(
                "handshake_timeout must be positive".to_string(),
            ));
        }

        let in_bounds = |pos: Position| {
            pos.x >= 0 && pos.y >= 0 && pos.x < config.width && pos.y < config.height
        };
        let is_obstacle = |pos: Position| config.obstacles.contains(&pos);
        let zones = ZoneMap::new(config.width);

        if let Some(pos) = config.obstacles.iter().find(|pos| !in_bounds(**pos)) {
            return Err(SimulationError::InvalidConfig(format!(
                "obstacle {} is outside the grid",
                pos
            )));
        }

        if !in_bounds(config.disposal) || config.disposal.x != config.width - 1 {
            return Err(SimulationError::InvalidConfig(format!(
                "disposal {} must lie on the eastern column",
                config.disposal
            )));
        }
        if is_obstacle(config.disposal) {
            return Err(SimulationError::InvalidConfig(
                "disposal cell is an obstacle".to_string(),
            ));
        }

        for placement in &config.items {
            let pos = placement.position;
            if !in_bounds(pos) || is_obstacle(pos) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} item at {} is outside the grid or on an obstacle",
                    placement.kind, pos
                )));
            }
            let collector = collector_of(placement.kind);
            if !collector.allows(zones.zone_of(pos)) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} item at {} lies outside the {} region",
                    placement.kind, pos, collector
                )));
            }
        }

        for (index, agent) in config.agents.iter().enumerate() {
            let pos = agent.position;
            if !in_bounds(pos) || is_obstacle(pos) {
                return Err(SimulationError::InvalidConfig(format!(
                    "agent {} at {} is outside the grid or on an obstacle",
                    index, pos
                )));
            }
            if !agent.tier.allows(zones.zone_of(pos)) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} agent {} starts in {}, outside its region",
                    agent.tier,
                    index,
                    zones.zone_of(pos)
                )));
            }
            if agent.carrying.len() > agent.tier.required_count()
                || agent.carrying.iter().any(|kind| *kind != agent.tier.input())
            {
                return Err(SimulationError::InvalidConfig(format!(
                    "agent {} may start with at most {} {} items",
                    index,
                    agent.tier.required_count(),
                    agent.tier.input()
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn ticks_elapsed(&self) -> u64 {
        self.time.current_tick()
    }

    pub fn items_delivered(&self) -> u64 {
        self.items_delivered
    }

    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    pub fn total_distance_moved(&self) -> u64 {
        self.agents.iter().map(Agent::distance_travelled).sum()
    }

    /// Live item counts, any state
    pub fn counts(&self) -> ItemCounts {
        self.pools.counts()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id as usize)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    pub fn pools(&self) -> &TaskPools {
        &self.pools
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Agents, on-grid items and markers at `pos`
    pub fn contents(&self, pos: Position) -> CellContents {
        CellContents {
            agents: self.grid.agents_at(pos),
            items: self.pools.contents(pos),
            obstacle: self.grid.is_obstacle(pos),
            disposal: self.grid.disposal() == pos,
        }
    }

    // ========================================================================
    // Tick loop
    // ========================================================================

    /// Execute one tick: every agent acts once
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        let tick = self.time.current_tick();
        let log_start = self.event_log.len();

        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        if self.shuffle_agents {
            self.rng.shuffle(&mut order);
        }

        let mut actions = Vec::with_capacity(order.len());
        let mut deliveries = 0;
        let mut transfers = 0;

        for index in order {
            let agent = &mut self.agents[index];
            let id = agent.id();
            let ranking = self
                .rankings
                .get_mut(&id)
                .ok_or(SimulationError::AgentNotFound(id))?;

            let mut ctx = TurnContext {
                tick,
                grid: &mut self.grid,
                zones: &self.zones,
                pools: &self.pools,
                bus: &self.bus,
                ranking: ranking.as_mut(),
                handshake_timeout: self.handshake_timeout,
                log: &mut self.event_log,
                disposed: 0,
                transfers: 0,
            };
            let action = agent.step(&mut ctx)?;
            deliveries += ctx.disposed;
            transfers += ctx.transfers;
            actions.push((id, action));
        }

        self.items_delivered += deliveries;
        self.transfers += transfers;
        self.time.advance_tick();

        self.check_invariants()?;

        let counts = self.pools.counts();
        let status = termination::evaluate(&counts);
        if status != self.status {
            self.event_log.log(Event::StatusChanged { tick, status });
            self.status = status;
        }

        let moves = self
            .event_log
            .since(log_start)
            .iter()
            .filter(|event| matches!(event, Event::Moved { .. }))
            .count();

        Ok(TickResult {
            tick,
            actions,
            moves,
            deliveries,
            transfers,
            counts,
            status,
        })
    }

    /// Tick until the oracle reports a terminal status or `max_ticks` more
    /// ticks have run.
    pub fn run(&mut self, max_ticks: u64) -> Result<RunSummary, SimulationError> {
        let mut ran = 0;
        while !self.status.is_terminal() && ran < max_ticks {
            self.tick()?;
            ran += 1;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            fingerprint: self.fingerprint.clone(),
            seed: self.seed,
            ticks: self.ticks_elapsed(),
            status: self.status,
            inconclusive: !self.status.is_terminal(),
            items_delivered: self.items_delivered,
            total_distance_moved: self.total_distance_moved(),
            transfers: self.transfers,
            remaining: self.counts(),
        }
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Cross-check the pool ledgers against agent inventories.
    ///
    /// - every assigned item is `Claimed` by its holder, every carried item
    ///   `Carried` by it, and no item is held by two agents
    /// - every `Claimed`/`Carried` ledger entry is backed by its agent, or by a
    ///   TRANSFER still on the bus addressed to it
    /// - every agent stands on an open cell of its own region
    pub(crate) fn check_invariants(&self) -> Result<(), SimulationError> {
        let mut holders: HashMap<ItemId, AgentId> = HashMap::new();

        for agent in &self.agents {
            let id = agent.id();
            let held = agent
                .assigned()
                .iter()
                .map(|item| (item, Owner::Claimed(id)))
                .chain(agent.carrying().iter().map(|item| (item, Owner::Carried(id))));
            for (item, expected) in held {
                if let Some(other) = holders.insert(item.id, id) {
                    return Err(SimulationError::InvariantViolation(format!(
                        "item {} held by agents {} and {}",
                        item.id, other, id
                    )));
                }
                let owner = self.pools.pool(item.kind).owner_of(item.id);
                if owner != Some(expected) {
                    return Err(SimulationError::InvariantViolation(format!(
                        "agent {} holds item {} but the ledger says {:?}",
                        id, item.id, owner
                    )));
                }
            }

            let pos = agent.position();
            if self.grid.position_of(id) != Some(pos) || !self.grid.is_passable(pos) {
                return Err(SimulationError::InvariantViolation(format!(
                    "agent {} is not on an open cell at {}",
                    id, pos
                )));
            }
            if !agent.tier().allows(self.zones.zone_of(pos)) {
                return Err(SimulationError::InvariantViolation(format!(
                    "{} agent {} left its region at {}",
                    agent.tier(),
                    id,
                    pos
                )));
            }
        }

        let mut in_flight: HashMap<ItemId, AgentId> = HashMap::new();
        for message in self.bus.pending() {
            if let (Some(recipient), MessageBody::Transfer { items }) =
                (message.recipient, &message.body)
            {
                for item in items {
                    in_flight.insert(item.id, recipient);
                }
            }
        }

        for pool in self.pools.iter() {
            for (item, owner) in pool.snapshot() {
                let backed = match owner {
                    Owner::Pool => !holders.contains_key(&item.id),
                    Owner::Claimed(agent) => holders.get(&item.id) == Some(&agent),
                    Owner::Carried(agent) => {
                        holders.get(&item.id) == Some(&agent)
                            || in_flight.get(&item.id) == Some(&agent)
                    }
                };
                if !backed {
                    return Err(SimulationError::InvariantViolation(format!(
                        "ledger entry {:?} for item {} has no matching holder",
                        owner, item.id
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Tier that collects items of `kind`.
fn collector_of(kind: WasteKind) -> Tier {
    match kind {
        WasteKind::Green => Tier::Green,
        WasteKind::Yellow => Tier::Yellow,
        WasteKind::Red => Tier::Red,
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.time.current_tick())
            .field("status", &self.status)
            .field("agents", &self.agents.len())
            .field("counts", &self.pools.counts())
            .field("items_delivered", &self.items_delivered)
            .finish()
    }
}
