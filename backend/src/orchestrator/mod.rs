//! Orchestrator - main simulation loop
//!
//! Owns the world, runs agents in a seeded order each tick, checks ownership
//! invariants and asks the termination oracle for a verdict.
//!
//! See `engine.rs` for the full implementation.

pub mod engine;
pub mod summary;
pub mod termination;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use engine::{
    AgentConfig, CellContents, ItemPlacement, ScenarioConfig, Simulation, SimulationError,
    TickResult,
};
pub use summary::{compute_config_hash, RunSummary};
pub use termination::Status;
