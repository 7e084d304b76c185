//! Navigation
//!
//! A [`Pathfinder`] is a read-only view of the grid restricted to the columns
//! an agent's tier may enter. Two movers sit on top of it:
//! - [`Pathfinder::astar`]: optimal 8-connected search (see `astar.rs`)
//! - [`Pathfinder::step_towards`]: greedy single step (see `greedy.rs`)
//!
//! Neither ever proposes an obstacle, an out-of-bounds cell or a column east
//! of the region limit.

mod astar;
mod greedy;

use crate::models::{Grid, Position};

#[derive(Debug, Clone, Copy)]
pub struct Pathfinder<'a> {
    grid: &'a Grid,
    max_x: i32,
}

impl<'a> Pathfinder<'a> {
    /// Unrestricted view of the whole grid.
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            max_x: grid.width() - 1,
        }
    }

    /// View limited to columns `0..=max_x`.
    pub fn confined(grid: &'a Grid, max_x: i32) -> Self {
        Self { grid, max_x }
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    /// Cell may be entered: in bounds, not an obstacle, inside the region.
    pub fn is_open(&self, pos: Position) -> bool {
        pos.x <= self.max_x && self.grid.is_passable(pos)
    }

    /// Open neighbours in the grid's fixed neighbour order.
    pub fn open_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        self.grid
            .neighbors8(pos)
            .into_iter()
            .filter(move |next| self.is_open(*next))
    }
}
