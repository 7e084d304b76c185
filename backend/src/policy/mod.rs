//! Claim Ranking Policy Module
//!
//! This module defines how an agent orders the candidate items a task pool
//! offers it before the best `n` are claimed.
//!
//! # Overview
//!
//! Each agent carries a [`Heuristic`] selector fixed at world generation. The
//! orchestrator turns it into a boxed [`ClaimRanking`] through
//! [`build_ranking`] and lends it to the agent every turn. The choice affects:
//! - Which items are claimed when several are visible
//! - Travel distance (and so run length)
//! - Whether the agent navigates with A* or with greedy steps
//!
//! Available heuristics:
//! 1. **Closest**: nearest first (Chebyshev distance from the agent)
//! 2. **Farthest**: farthest first
//! 3. **MinTotalDistance**: distance to the item plus item-to-target distance
//! 4. **SearchCost**: A* path length to the item plus item-to-target distance
//! 5. **Random**: seeded shuffle
//!
//! Every ranking is a stable sort over the pool's insertion order, so ties
//! always resolve the same way and a seed fully determines the outcome.
//!
//! ```rust
//! use robot_mission_core_rs::policy::{build_ranking, Heuristic, RankingContext};
//! use robot_mission_core_rs::routing::Pathfinder;
//! use robot_mission_core_rs::models::{DeliveryTarget, Grid, Position, WasteItem, WasteKind};
//!
//! let grid = Grid::new(9, 3, [], Position::new(8, 0));
//! let ctx = RankingContext {
//!     origin: Position::new(0, 0),
//!     target: DeliveryTarget::Column(2),
//!     pathfinder: Pathfinder::confined(&grid, 2),
//! };
//! let item = |id, x| WasteItem { id, kind: WasteKind::Green, position: Position::new(x, 0) };
//! let mut candidates = vec![item(1, 2), item(2, 1)];
//!
//! let mut ranking = build_ranking(Heuristic::Closest, 7);
//! ranking.rank(&mut candidates, &ctx);
//! assert_eq!(candidates[0].id, 2);
//! ```

mod distance;
mod random;
mod search_cost;

pub use distance::{ClosestFirst, FarthestFirst, MinTotalDistance};
pub use random::RandomOrder;
pub use search_cost::SearchCost;

use crate::models::{DeliveryTarget, Position, WasteItem};
use crate::routing::Pathfinder;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a ranking may look at
#[derive(Debug, Clone, Copy)]
pub struct RankingContext<'a> {
    /// Where the claiming agent stands.
    pub origin: Position,
    /// Where the agent will deliver its product.
    pub target: DeliveryTarget,
    /// Grid view confined to the agent's region.
    pub pathfinder: Pathfinder<'a>,
}

/// Orders claim candidates, best first
pub trait ClaimRanking: Send {
    fn rank(&mut self, candidates: &mut [WasteItem], ctx: &RankingContext<'_>);

    /// Agents using this ranking navigate with A* instead of greedy steps.
    fn uses_path_search(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}

/// Per-agent ranking selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    #[default]
    Closest,
    Farthest,
    MinTotalDistance,
    SearchCost,
    Random,
}

impl Heuristic {
    pub const ALL: [Heuristic; 5] = [
        Heuristic::Closest,
        Heuristic::Farthest,
        Heuristic::MinTotalDistance,
        Heuristic::SearchCost,
        Heuristic::Random,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Heuristic::Closest => "closest",
            Heuristic::Farthest => "farthest",
            Heuristic::MinTotalDistance => "min_total_distance",
            Heuristic::SearchCost => "search_cost",
            Heuristic::Random => "random",
        }
    }
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "closest" | "nearest" => Ok(Heuristic::Closest),
            "farthest" | "furthest" => Ok(Heuristic::Farthest),
            "min_total_distance" | "min_total" => Ok(Heuristic::MinTotalDistance),
            "search_cost" | "astar" | "a_star" => Ok(Heuristic::SearchCost),
            "random" => Ok(Heuristic::Random),
            other => Err(format!("unknown heuristic '{other}'")),
        }
    }
}

/// Factory: build the ranking an agent's heuristic selects.
///
/// `seed` only matters for [`Heuristic::Random`].
pub fn build_ranking(heuristic: Heuristic, seed: u64) -> Box<dyn ClaimRanking> {
    match heuristic {
        Heuristic::Closest => Box::new(ClosestFirst),
        Heuristic::Farthest => Box::new(FarthestFirst),
        Heuristic::MinTotalDistance => Box::new(MinTotalDistance),
        Heuristic::SearchCost => Box::new(SearchCost),
        Heuristic::Random => Box::new(RandomOrder::new(seed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("nearest".parse::<Heuristic>(), Ok(Heuristic::Closest));
        assert_eq!("min-total".parse::<Heuristic>(), Ok(Heuristic::MinTotalDistance));
        assert_eq!("A_STAR".parse::<Heuristic>(), Ok(Heuristic::SearchCost));
        assert!("teleport".parse::<Heuristic>().is_err());
    }

    #[test]
    fn test_factory_names() {
        for heuristic in Heuristic::ALL {
            let ranking = build_ranking(heuristic, 1);
            assert_eq!(ranking.name(), heuristic.label());
            assert_eq!(
                ranking.uses_path_search(),
                heuristic == Heuristic::SearchCost
            );
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Heuristic::MinTotalDistance).unwrap();
        assert_eq!(json, "\"min_total_distance\"");
    }
}
