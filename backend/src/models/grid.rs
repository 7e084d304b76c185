//! Grid model
//!
//! A bounded, multi-occupancy 2D map. Cells may hold at most one obstacle and
//! any number of agents or waste items. Waste items are tracked by the task
//! pools; the grid itself only knows about obstacles, the disposal cell and
//! where each agent stands.
//!
//! # Critical Invariants
//!
//! 1. An agent is never placed on or moved onto an obstacle cell
//! 2. Every agent position is in bounds

use crate::models::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Integer grid coordinate. `x` grows eastward, `y` grows southward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance.
    pub fn chebyshev(self, other: Position) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    /// Squared Euclidean distance, used only to break greedy-move ties.
    pub fn distance_sq(self, other: Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Integer midpoint, floor division per axis.
    pub fn midpoint(self, other: Position) -> Position {
        Position {
            x: (self.x + other.x).div_euclid(2),
            y: (self.y + other.y).div_euclid(2),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Errors raised when moving an agent on the grid
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("Position {0} is an obstacle")]
    Obstacle(Position),

    #[error("Agent {0} is not on the grid")]
    UnknownAgent(AgentId),
}

/// Bounded occupancy map
///
/// # Example
/// ```
/// use robot_mission_core_rs::{Grid, Position};
///
/// let grid = Grid::new(5, 5, [Position::new(2, 2)], Position::new(4, 0));
/// assert!(grid.in_bounds(Position::new(4, 4)));
/// assert!(grid.is_obstacle(Position::new(2, 2)));
/// assert_eq!(grid.neighbors8(Position::new(0, 0)).len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    obstacles: HashSet<Position>,
    disposal: Position,
    occupants: BTreeMap<AgentId, Position>,
}

impl Grid {
    pub fn new(
        width: i32,
        height: i32,
        obstacles: impl IntoIterator<Item = Position>,
        disposal: Position,
    ) -> Self {
        Self {
            width,
            height,
            obstacles: obstacles.into_iter().collect(),
            disposal,
            occupants: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn disposal(&self) -> Position {
        self.disposal
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }

    /// In bounds and not an obstacle.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.is_obstacle(pos)
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// The 8 Chebyshev neighbours of `pos` that lie inside the grid, in a
    /// fixed row-major order (obstacles included).
    pub fn neighbors8(&self, pos: Position) -> Vec<Position> {
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let next = Position::new(pos.x + dx, pos.y + dy);
                if self.in_bounds(next) {
                    out.push(next);
                }
            }
        }
        out
    }

    /// Place an agent at its starting cell.
    pub fn place_agent(&mut self, agent: AgentId, pos: Position) -> Result<(), MoveError> {
        self.check_enterable(pos)?;
        self.occupants.insert(agent, pos);
        Ok(())
    }

    /// Move an already placed agent. Refuses obstacle and out-of-bounds cells.
    pub fn move_agent(&mut self, agent: AgentId, to: Position) -> Result<(), MoveError> {
        self.check_enterable(to)?;
        match self.occupants.get_mut(&agent) {
            Some(slot) => {
                *slot = to;
                Ok(())
            }
            None => Err(MoveError::UnknownAgent(agent)),
        }
    }

    pub fn position_of(&self, agent: AgentId) -> Option<Position> {
        self.occupants.get(&agent).copied()
    }

    /// Agents standing on `pos`, ascending by id.
    pub fn agents_at(&self, pos: Position) -> Vec<AgentId> {
        self.occupants
            .iter()
            .filter(|(_, p)| **p == pos)
            .map(|(id, _)| *id)
            .collect()
    }

    fn check_enterable(&self, pos: Position) -> Result<(), MoveError> {
        if !self.in_bounds(pos) {
            return Err(MoveError::OutOfBounds(pos));
        }
        if self.is_obstacle(pos) {
            return Err(MoveError::Obstacle(pos));
        }
        Ok(())
    }
}
