//! Waste item model
//!
//! Items form a linear upgrade chain: two green make one yellow, two yellow
//! make one red, and red is disposed of. Each item lives in an arena keyed by
//! [`ItemId`] and is owned by exactly one party at a time (see [`Owner`]).

use crate::models::{AgentId, ItemId, Position};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteKind {
    Green,
    Yellow,
    Red,
}

impl WasteKind {
    pub const ALL: [WasteKind; 3] = [WasteKind::Green, WasteKind::Yellow, WasteKind::Red];

    /// Kind produced by combining two of this kind. Red is terminal.
    pub const fn next(self) -> Option<WasteKind> {
        match self {
            WasteKind::Green => Some(WasteKind::Yellow),
            WasteKind::Yellow => Some(WasteKind::Red),
            WasteKind::Red => None,
        }
    }

    /// Base-unit mass: a red item embodies four green ones.
    pub const fn mass(self) -> u64 {
        match self {
            WasteKind::Green => 1,
            WasteKind::Yellow => 2,
            WasteKind::Red => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            WasteKind::Green => "green",
            WasteKind::Yellow => "yellow",
            WasteKind::Red => "red",
        }
    }
}

impl std::fmt::Display for WasteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WasteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" | "tier1" => Ok(WasteKind::Green),
            "yellow" | "tier2" => Ok(WasteKind::Yellow),
            "red" | "tier3" => Ok(WasteKind::Red),
            other => Err(format!("unknown waste kind '{other}'")),
        }
    }
}

/// A single waste item. `position` is where it lies on the grid, or where it
/// was last picked up while carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteItem {
    pub id: ItemId,
    pub kind: WasteKind,
    pub position: Position,
}

/// Who currently owns an item.
///
/// Unclaimed items belong to their kind's pool; claimed items are reserved
/// by one agent but still on the grid; carried items are off the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Pool,
    Claimed(AgentId),
    Carried(AgentId),
}

impl Owner {
    pub fn is_on_grid(self) -> bool {
        matches!(self, Owner::Pool | Owner::Claimed(_))
    }
}

/// Live item counts per kind (unclaimed, claimed and carried combined)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounts {
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
}

impl ItemCounts {
    pub fn get(&self, kind: WasteKind) -> usize {
        match kind {
            WasteKind::Green => self.green,
            WasteKind::Yellow => self.yellow,
            WasteKind::Red => self.red,
        }
    }

    pub fn set(&mut self, kind: WasteKind, count: usize) {
        match kind {
            WasteKind::Green => self.green = count,
            WasteKind::Yellow => self.yellow = count,
            WasteKind::Red => self.red = count,
        }
    }

    pub fn total(&self) -> usize {
        self.green + self.yellow + self.red
    }

    /// Total base-unit mass of all live items.
    pub fn mass(&self) -> u64 {
        WasteKind::ALL
            .iter()
            .map(|kind| kind.mass() * self.get(*kind) as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combining_preserves_mass() {
        for kind in [WasteKind::Green, WasteKind::Yellow] {
            let next = kind.next().unwrap();
            assert_eq!(2 * kind.mass(), next.mass());
        }
        assert_eq!(WasteKind::Red.next(), None);
    }

    #[test]
    fn test_counts_mass() {
        let counts = ItemCounts {
            green: 3,
            yellow: 1,
            red: 2,
        };
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.mass(), 3 + 2 + 8);
    }

    #[test]
    fn test_parse_kind_aliases() {
        assert_eq!("tier2".parse::<WasteKind>(), Ok(WasteKind::Yellow));
        assert_eq!(" Red ".parse::<WasteKind>(), Ok(WasteKind::Red));
        assert!("blue".parse::<WasteKind>().is_err());
    }
}
