//! Search-cost ranking
//!
//! Orders candidates by true travel cost: A* path length from the agent to
//! the item (within the agent's region) plus the item's distance to the
//! delivery target. Unreachable items sort last.

use super::{ClaimRanking, RankingContext};
use crate::models::WasteItem;

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchCost;

impl ClaimRanking for SearchCost {
    fn rank(&mut self, candidates: &mut [WasteItem], ctx: &RankingContext<'_>) {
        candidates.sort_by_cached_key(|item| {
            match ctx.pathfinder.path_len(ctx.origin, item.position) {
                Some(len) => (0u8, len + ctx.target.distance_from(item.position) as usize),
                None => (1, usize::MAX),
            }
        });
    }

    fn uses_path_search(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "search_cost"
    }
}
