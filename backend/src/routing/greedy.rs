//! Greedy single-step mover
//!
//! Picks the open neighbour that strictly reduces Chebyshev distance to the
//! target; ties go to the smaller squared Euclidean distance, then to
//! neighbour order. No search, so it can stall behind obstacles.

use super::Pathfinder;
use crate::models::Position;

impl Pathfinder<'_> {
    /// Next cell towards `target`, or `None` to stay in place.
    pub fn step_towards(&self, from: Position, target: Position) -> Option<Position> {
        let current = from.chebyshev(target);
        if current == 0 {
            return None;
        }

        let mut best: Option<(u32, i64, Position)> = None;
        for next in self.open_neighbors(from) {
            let d = next.chebyshev(target);
            if d >= current {
                continue;
            }
            let key = (d, next.distance_sq(target));
            match best {
                Some((bd, bsq, _)) if (bd, bsq) <= key => {}
                _ => best = Some((key.0, key.1, next)),
            }
        }
        best.map(|(_, _, pos)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grid;

    #[test]
    fn test_prefers_diagonal() {
        let grid = Grid::new(5, 5, [], Position::new(4, 0));
        let finder = Pathfinder::new(&grid);
        assert_eq!(
            finder.step_towards(Position::new(0, 0), Position::new(3, 3)),
            Some(Position::new(1, 1))
        );
        assert_eq!(
            finder.step_towards(Position::new(0, 2), Position::new(4, 2)),
            Some(Position::new(1, 2))
        );
    }

    #[test]
    fn test_refuses_obstacles() {
        let walls = [Position::new(1, 0), Position::new(1, 1)];
        let grid = Grid::new(3, 2, walls, Position::new(2, 0));
        let finder = Pathfinder::new(&grid);
        assert_eq!(finder.step_towards(Position::new(0, 0), Position::new(2, 0)), None);
    }

    #[test]
    fn test_stays_when_arrived_or_out_of_region() {
        let grid = Grid::new(9, 3, [], Position::new(8, 0));
        let finder = Pathfinder::confined(&grid, 2);
        assert_eq!(finder.step_towards(Position::new(1, 1), Position::new(1, 1)), None);
        assert_eq!(finder.step_towards(Position::new(2, 1), Position::new(5, 1)), None);
    }
}
