//! Time management for the simulation
//!
//! The simulation operates in discrete ticks. Every agent acts once per tick.

use serde::{Deserialize, Serialize};

/// Counts elapsed simulation ticks
///
/// # Example
/// ```
/// use robot_mission_core_rs::TimeManager;
///
/// let mut time = TimeManager::new();
/// assert_eq!(time.current_tick(), 0);
///
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeManager {
    /// Total ticks elapsed since simulation start
    current_tick: u64,
}

impl TimeManager {
    /// Create a clock at tick 0
    pub fn new() -> Self {
        Self { current_tick: 0 }
    }

    /// Advance time by one tick
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Ticks elapsed since start
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Number of ticks between `since` and now (saturating)
    pub fn ticks_since(&self, since: u64) -> u64 {
        self.current_tick.saturating_sub(since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_since_saturates() {
        let mut time = TimeManager::new();
        time.advance_tick();
        assert_eq!(time.ticks_since(0), 1);
        assert_eq!(time.ticks_since(5), 0);
    }
}
