//! Boustrophedon sweep
//!
//! With nothing assigned and nothing claimable, an agent sweeps its region
//! column by column: walk to the scan column, run up or down it, and at each
//! vertical reversal shift the scan column by one in the drift direction.
//! The drift bounces off the region's western and eastern edges.

use super::{AgentAction, TurnContext};
use crate::models::{Agent, Position, ScoutCursor};
use crate::orchestrator::SimulationError;
use crate::routing::Pathfinder;

impl ScoutCursor {
    /// Shift the scan column one step in the drift direction, reversing the
    /// drift at the edges of `0..=max_x`.
    pub fn advance(&mut self, max_x: i32) {
        if max_x <= 0 {
            self.column = 0;
            return;
        }
        let mut next = self.column + self.drift;
        if next < 0 || next > max_x {
            self.drift = -self.drift;
            next = self.column + self.drift;
        }
        self.column = next.clamp(0, max_x);
    }
}

impl Agent {
    pub(super) fn scout_step(
        &mut self,
        ctx: &mut TurnContext<'_>,
    ) -> Result<AgentAction, SimulationError> {
        let max_x = self.tier.boundary_x(ctx.zones);
        let mut cursor = self
            .scout
            .unwrap_or_else(|| ScoutCursor::starting_at(self.position.x.clamp(0, max_x)));

        if self.position.x == cursor.column {
            let (next, beyond) = {
                let finder = Pathfinder::confined(ctx.grid, max_x);
                let here = self.position;
                let next = Position::new(here.x, here.y + cursor.vertical);
                let beyond = (2..finder.grid().height())
                    .map(|k| Position::new(here.x, here.y + k * cursor.vertical))
                    .take_while(|cell| finder.grid().in_bounds(*cell))
                    .find(|cell| finder.is_open(*cell));
                (finder.is_open(next).then_some(next), beyond)
            };
            if let Some(next) = next {
                self.move_to(ctx, next)?;
                self.scout = Some(cursor);
                return Ok(AgentAction::Scout);
            }
            // Obstacle in the column: go around it.
            if let Some(beyond) = beyond {
                if self.navigate(ctx, beyond)? {
                    self.scout = Some(cursor);
                    return Ok(AgentAction::Scout);
                }
            }
            // Column done in this direction: reverse and move over.
            cursor.vertical = -cursor.vertical;
            cursor.advance(max_x);
        }

        let entry = {
            let finder = Pathfinder::confined(ctx.grid, max_x);
            column_entry(&finder, cursor.column, self.position, cursor.vertical)
        };
        let moved = match entry {
            Some(cell) if cell != self.position => self.navigate(ctx, cell)?,
            _ => false,
        };
        if !moved {
            // Unreachable from here, try the next one.
            cursor.advance(max_x);
        }
        self.scout = Some(cursor);
        Ok(if moved {
            AgentAction::Scout
        } else {
            AgentAction::Wait
        })
    }
}

/// Open cell of `column` nearest to `from`'s row, preferring rows ahead in
/// the sweep direction.
fn column_entry(
    finder: &Pathfinder<'_>,
    column: i32,
    from: Position,
    vertical: i32,
) -> Option<Position> {
    for offset in 0..finder.grid().height() {
        for y in [from.y + vertical * offset, from.y - vertical * offset] {
            let cell = Position::new(column, y);
            if finder.is_open(cell) {
                return Some(cell);
            }
        }
    }
    None
}
