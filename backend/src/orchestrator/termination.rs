//! Termination oracle
//!
//! A pure function of live item counts (unclaimed, claimed and carried
//! combined). With `g`, `y`, `r` the green, yellow and red counts:
//!
//! ```text
//! reachable_tier2 = y + g / 2
//! reachable_tier3 = r + reachable_tier2 / 2
//!
//! won     <=> g = y = r = 0
//! lost    <=> reachable_tier3 = 0 and not won
//! running    otherwise
//! ```
//!
//! `lost` is exact: no sequence of future combines can produce a red item.

use crate::models::ItemCounts;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Running,
    Won,
    Lost,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Running)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Status::Running => "running",
            Status::Won => "won",
            Status::Lost => "lost",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Most yellow items that could ever exist from the current counts.
pub fn reachable_tier2(counts: &ItemCounts) -> usize {
    counts.yellow + counts.green / 2
}

/// Most red items that could ever exist from the current counts.
pub fn reachable_tier3(counts: &ItemCounts) -> usize {
    counts.red + reachable_tier2(counts) / 2
}

pub fn evaluate(counts: &ItemCounts) -> Status {
    if counts.total() == 0 {
        Status::Won
    } else if reachable_tier3(counts) == 0 {
        Status::Lost
    } else {
        Status::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(green: usize, yellow: usize, red: usize) -> ItemCounts {
        ItemCounts { green, yellow, red }
    }

    #[test]
    fn test_empty_is_won() {
        assert_eq!(evaluate(&counts(0, 0, 0)), Status::Won);
    }

    #[test]
    fn test_single_green_is_lost() {
        assert_eq!(evaluate(&counts(1, 0, 0)), Status::Lost);
    }

    #[test]
    fn test_lost_cases() {
        assert_eq!(evaluate(&counts(3, 0, 0)), Status::Lost);
        assert_eq!(evaluate(&counts(1, 1, 0)), Status::Lost);
        assert_eq!(evaluate(&counts(0, 1, 0)), Status::Lost);
    }

    #[test]
    fn test_running_cases() {
        assert_eq!(evaluate(&counts(4, 0, 0)), Status::Running);
        assert_eq!(evaluate(&counts(2, 1, 0)), Status::Running);
        assert_eq!(evaluate(&counts(0, 2, 0)), Status::Running);
        assert_eq!(evaluate(&counts(1, 0, 1)), Status::Running);
    }

    #[test]
    fn test_reachable_counts() {
        let c = counts(5, 3, 1);
        assert_eq!(reachable_tier2(&c), 5);
        assert_eq!(reachable_tier3(&c), 3);
    }
}
