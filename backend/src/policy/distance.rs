//! Distance-based rankings
//!
//! Straight-line (Chebyshev) orderings. Cheap, and paired with greedy
//! movement.

use super::{ClaimRanking, RankingContext};
use crate::models::WasteItem;
use std::cmp::Reverse;

/// Nearest item first
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestFirst;

impl ClaimRanking for ClosestFirst {
    fn rank(&mut self, candidates: &mut [WasteItem], ctx: &RankingContext<'_>) {
        candidates.sort_by_key(|item| ctx.origin.chebyshev(item.position));
    }

    fn name(&self) -> &'static str {
        "closest"
    }
}

/// Farthest item first
#[derive(Debug, Clone, Copy, Default)]
pub struct FarthestFirst;

impl ClaimRanking for FarthestFirst {
    fn rank(&mut self, candidates: &mut [WasteItem], ctx: &RankingContext<'_>) {
        candidates.sort_by_key(|item| Reverse(ctx.origin.chebyshev(item.position)));
    }

    fn name(&self) -> &'static str {
        "farthest"
    }
}

/// Shortest detour: reach the item, then carry it to the delivery target
#[derive(Debug, Clone, Copy, Default)]
pub struct MinTotalDistance;

impl ClaimRanking for MinTotalDistance {
    fn rank(&mut self, candidates: &mut [WasteItem], ctx: &RankingContext<'_>) {
        candidates.sort_by_key(|item| {
            ctx.origin.chebyshev(item.position) + ctx.target.distance_from(item.position)
        });
    }

    fn name(&self) -> &'static str {
        "min_total_distance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryTarget, Grid, ItemId, Position, WasteKind};
    use crate::routing::Pathfinder;

    fn item(id: ItemId, x: i32, y: i32) -> WasteItem {
        WasteItem {
            id,
            kind: WasteKind::Green,
            position: Position::new(x, y),
        }
    }

    fn ids(items: &[WasteItem]) -> Vec<ItemId> {
        items.iter().map(|item| item.id).collect()
    }

    fn ranked(ranking: &mut dyn ClaimRanking, mut items: Vec<WasteItem>) -> Vec<ItemId> {
        let grid = Grid::new(9, 9, [], Position::new(8, 0));
        let ctx = RankingContext {
            origin: Position::new(4, 4),
            target: DeliveryTarget::Column(8),
            pathfinder: Pathfinder::new(&grid),
        };
        ranking.rank(&mut items, &ctx);
        ids(&items)
    }

    #[test]
    fn test_closest_keeps_insertion_order_on_ties() {
        let items = vec![item(1, 6, 4), item(2, 4, 5), item(3, 2, 2), item(4, 3, 3)];
        assert_eq!(ranked(&mut ClosestFirst, items), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_farthest() {
        let items = vec![item(1, 5, 5), item(2, 0, 0), item(3, 4, 7)];
        assert_eq!(ranked(&mut FarthestFirst, items), vec![2, 3, 1]);
    }

    #[test]
    fn test_min_total_prefers_items_on_the_way() {
        // Both are 2 away from the agent; item 2 is closer to the target column.
        let items = vec![item(1, 2, 4), item(2, 6, 4)];
        assert_eq!(ranked(&mut MinTotalDistance, items), vec![2, 1]);
    }
}
