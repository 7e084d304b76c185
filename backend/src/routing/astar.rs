//! A* search
//!
//! Unit cost for each of the 8 moves, Chebyshev heuristic. The heuristic is
//! consistent under that cost model, so the first time a cell is expanded its
//! cost is final and the returned path is optimal. Equal priorities pop in
//! insertion order.

use super::Pathfinder;
use crate::models::Position;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frontier {
    f: u32,
    seq: u64,
    pos: Position,
}

// BinaryHeap is a max-heap: invert so the lowest (f, seq) pops first.
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Pathfinder<'_> {
    /// Shortest path from `start` to `goal`, excluding `start`.
    ///
    /// Empty when `start == goal`, when `goal` cannot be entered, or when no
    /// route exists.
    pub fn astar(&self, start: Position, goal: Position) -> Vec<Position> {
        if start == goal || !self.is_open(goal) {
            return Vec::new();
        }

        let mut open = BinaryHeap::new();
        let mut g_score: HashMap<Position, u32> = HashMap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut closed: HashSet<Position> = HashSet::new();
        let mut seq = 0u64;

        g_score.insert(start, 0);
        open.push(Frontier {
            f: start.chebyshev(goal),
            seq,
            pos: start,
        });

        while let Some(Frontier { pos, .. }) = open.pop() {
            if pos == goal {
                return reconstruct(&came_from, start, goal);
            }
            if !closed.insert(pos) {
                continue;
            }

            let g = g_score.get(&pos).copied().unwrap_or(u32::MAX);
            for next in self.open_neighbors(pos) {
                if closed.contains(&next) {
                    continue;
                }
                let tentative = g + 1;
                if tentative < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                    g_score.insert(next, tentative);
                    came_from.insert(next, pos);
                    seq += 1;
                    open.push(Frontier {
                        f: tentative + next.chebyshev(goal),
                        seq,
                        pos: next,
                    });
                }
            }
        }

        Vec::new()
    }

    /// Number of moves on the shortest route, `Some(0)` when already there.
    pub fn path_len(&self, start: Position, goal: Position) -> Option<usize> {
        if start == goal {
            return Some(0);
        }
        let path = self.astar(start, goal);
        (!path.is_empty()).then_some(path.len())
    }
}

fn reconstruct(
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from.get(&current) {
        if *prev == start {
            break;
        }
        path.push(*prev);
        current = *prev;
    }
    path.reverse();
    path
}
