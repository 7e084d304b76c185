//! Local sensing
//!
//! Agents only know about items someone has looked at. Each turn the acting
//! agent scans every cell within its vision radius and the items found join
//! the shared seen-set; claiming is restricted to seen items.
//!
//! The seen-set is sharded by waste kind and stored inside each kind's
//! [`TaskPool`](super::TaskPool) so that dropping an item from it on pickup
//! shares the pool's critical section. This type is the read/write view over
//! those shards.

use super::TaskPools;
use crate::models::{Position, WasteItem, WasteKind};

#[derive(Debug, Clone, Copy)]
pub struct VisibilityTracker<'a> {
    pools: &'a TaskPools,
}

impl<'a> VisibilityTracker<'a> {
    pub fn new(pools: &'a TaskPools) -> Self {
        Self { pools }
    }

    /// Scan the square of Chebyshev `radius` around `center`. Returns the
    /// number of items seen for the first time.
    pub fn sense(&self, center: Position, radius: u32) -> usize {
        self.pools
            .iter()
            .map(|pool| pool.observe(center, radius))
            .sum()
    }

    pub fn is_seen(&self, item: &WasteItem) -> bool {
        self.pools.pool(item.kind).is_seen(item.id)
    }

    /// Items currently in the seen-set, all kinds.
    pub fn seen_count(&self) -> usize {
        self.pools.iter().map(|pool| pool.seen_count()).sum()
    }

    /// Some seen, unclaimed item of `kind` passes `filter`.
    pub fn any_claimable<F>(&self, kind: WasteKind, filter: F) -> bool
    where
        F: Fn(&WasteItem) -> bool,
    {
        self.pools.pool(kind).has_visible_unclaimed(filter)
    }
}
