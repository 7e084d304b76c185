//! Deterministic random number generation
//!
//! Agent turn order, the random claim heuristic and scenario generation all
//! draw from this module so that a seed fully determines a run.

mod xorshift;

pub use xorshift::RngManager;
