//! Unordered ranking: a seeded shuffle per claim.

use super::{ClaimRanking, RankingContext};
use crate::models::WasteItem;
use crate::rng::RngManager;

#[derive(Debug, Clone)]
pub struct RandomOrder {
    rng: RngManager,
}

impl RandomOrder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RngManager::new(seed),
        }
    }
}

impl ClaimRanking for RandomOrder {
    fn rank(&mut self, candidates: &mut [WasteItem], _ctx: &RankingContext<'_>) {
        self.rng.shuffle(candidates);
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
