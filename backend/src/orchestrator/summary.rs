//! Run summaries and scenario fingerprints
//!
//! A [`RunSummary`] is what a host harness (the CLI, a batch runner) keeps
//! from a finished run. Its `fingerprint` is a SHA-256 over the canonical
//! JSON form of the scenario, so results can be grouped by scenario no
//! matter how the config file was formatted.

use crate::models::ItemCounts;
use crate::orchestrator::{SimulationError, Status};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Outcome of [`Simulation::run`](crate::Simulation::run)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scenario hash (see [`compute_config_hash`])
    pub fingerprint: String,
    pub seed: u64,
    /// Ticks elapsed when the run stopped
    pub ticks: u64,
    pub status: Status,
    /// Tick bound hit while still running
    pub inconclusive: bool,
    /// Red items destroyed at the disposal cell
    pub items_delivered: u64,
    pub total_distance_moved: u64,
    pub transfers: u64,
    /// Live items left when the run stopped
    pub remaining: ItemCounts,
}

/// Compute SHA-256 hash of a config
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on field or map ordering.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
