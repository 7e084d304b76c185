//! Robot Mission Core - Rust Engine
//!
//! Multi-agent waste-collection simulator with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Time management
//! - **models**: Domain types (Grid, Zone, Tier, WasteItem, Agent, Message, Event)
//! - **coordination**: Shared state (task pools, seen-set, message bus)
//! - **routing**: A* pathfinding and the greedy single-step mover
//! - **policy**: Claim heuristics (which visible items an agent takes first)
//! - **behavior**: The per-agent decision procedure and handshake protocol
//! - **orchestrator**: Main simulation loop and termination oracle
//! - **generation**: Seeded scenario generator
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. An item is owned by exactly one of: its pool, one agent's assignments,
//!    one agent's inventory
//! 2. Agents never leave their tier's region
//! 3. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod behavior;
pub mod coordination;
pub mod core;
pub mod generation;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod rng;
pub mod routing;

// Re-exports for convenience
pub use behavior::AgentAction;
pub use coordination::{MessageBus, PoolError, TaskPool, TaskPools, VisibilityTracker};
pub use core::time::TimeManager;
pub use models::{
    Agent, AgentId, Event, EventLog, Grid, ItemCounts, ItemId, Message, MessageBody, Owner,
    Position, Tier, WasteItem, WasteKind, Zone, ZoneMap,
};
pub use orchestrator::{
    AgentConfig, CellContents, ItemPlacement, RunSummary, ScenarioConfig, Simulation,
    SimulationError, Status, TickResult,
};
pub use policy::Heuristic;
pub use rng::RngManager;
pub use routing::Pathfinder;
