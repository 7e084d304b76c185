//! Agent tiers
//!
//! Every agent runs the same decision procedure; a [`Tier`] supplies the
//! parameters that differ (input/output kinds, allowed zones, combine count)
//! and a [`DeliveryRule`] supplies the tier-specific delivery behaviour:
//! green and yellow robots drop their product at the eastern edge of their
//! region, red robots carry to the disposal cell.

use crate::models::{Grid, Position, WasteKind, Zone, ZoneMap};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Green, Tier::Yellow, Tier::Red];

    /// Kind this tier collects.
    pub const fn input(self) -> WasteKind {
        match self {
            Tier::Green => WasteKind::Green,
            Tier::Yellow => WasteKind::Yellow,
            Tier::Red => WasteKind::Red,
        }
    }

    /// Kind this tier delivers. Red robots deliver what they collect.
    pub const fn output(self) -> WasteKind {
        match self {
            Tier::Green => WasteKind::Yellow,
            Tier::Yellow => WasteKind::Red,
            Tier::Red => WasteKind::Red,
        }
    }

    /// Input items needed before the tier has something to deliver.
    pub const fn required_count(self) -> usize {
        match self {
            Tier::Green | Tier::Yellow => 2,
            Tier::Red => 1,
        }
    }

    /// Whether inputs are combined into an output item.
    pub const fn combines(self) -> bool {
        !matches!(self, Tier::Red)
    }

    pub const fn allowed_zones(self) -> &'static [Zone] {
        match self {
            Tier::Green => &[Zone::Z1],
            Tier::Yellow => &[Zone::Z1, Zone::Z2],
            Tier::Red => &[Zone::Z1, Zone::Z2, Zone::Z3],
        }
    }

    /// Eastern-most column the tier may occupy.
    pub fn boundary_x(self, zones: &ZoneMap) -> i32 {
        let last = match self {
            Tier::Green => Zone::Z1,
            Tier::Yellow => Zone::Z2,
            Tier::Red => Zone::Z3,
        };
        zones.eastern_edge(last)
    }

    pub fn allows(self, zone: Zone) -> bool {
        self.allowed_zones().contains(&zone)
    }

    pub fn delivery_rule(self) -> &'static dyn DeliveryRule {
        match self {
            Tier::Green | Tier::Yellow => &BoundaryDrop,
            Tier::Red => &Disposal,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Tier::Green => "green",
            Tier::Yellow => "yellow",
            Tier::Red => "red",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" | "tier1" => Ok(Tier::Green),
            "yellow" | "tier2" => Ok(Tier::Yellow),
            "red" | "tier3" => Ok(Tier::Red),
            other => Err(format!("unknown tier '{other}'")),
        }
    }
}

/// Where a carrier is heading with its product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// Any cell of this column counts as arrival.
    Column(i32),
    /// Exactly this cell.
    Cell(Position),
}

impl DeliveryTarget {
    pub fn reached(&self, pos: Position) -> bool {
        match self {
            DeliveryTarget::Column(x) => pos.x == *x,
            DeliveryTarget::Cell(cell) => pos == *cell,
        }
    }

    /// Chebyshev distance from `pos` to the target.
    pub fn distance_from(&self, pos: Position) -> u32 {
        match self {
            DeliveryTarget::Column(x) => (pos.x - x).unsigned_abs(),
            DeliveryTarget::Cell(cell) => pos.chebyshev(*cell),
        }
    }

    /// Concrete cell to navigate to from `from`. For a column this is the
    /// passable cell of that column closest to the current row.
    pub fn waypoint(&self, from: Position, grid: &Grid) -> Option<Position> {
        match self {
            DeliveryTarget::Cell(cell) => grid.is_passable(*cell).then_some(*cell),
            DeliveryTarget::Column(x) => {
                for offset in 0..grid.height() {
                    for y in [from.y + offset, from.y - offset] {
                        let candidate = Position::new(*x, y);
                        if grid.is_passable(candidate) {
                            return Some(candidate);
                        }
                    }
                }
                None
            }
        }
    }
}

/// What happens to the carried product on arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    /// Put a fresh item of this kind on the grid for the next tier.
    Respawn(WasteKind),
    /// Destroy the item and count it as delivered.
    Dispose,
}

/// Tier-specific delivery behaviour
pub trait DeliveryRule: Send + Sync {
    fn target(&self, boundary_x: i32, grid: &Grid) -> DeliveryTarget;

    fn outcome(&self, carried: WasteKind) -> DeliveryOutcome;
}

/// Carry east and drop at the region's eastern edge.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryDrop;

impl DeliveryRule for BoundaryDrop {
    fn target(&self, boundary_x: i32, _grid: &Grid) -> DeliveryTarget {
        DeliveryTarget::Column(boundary_x)
    }

    fn outcome(&self, carried: WasteKind) -> DeliveryOutcome {
        DeliveryOutcome::Respawn(carried)
    }
}

/// Carry to the disposal cell and destroy.
#[derive(Debug, Clone, Copy)]
pub struct Disposal;

impl DeliveryRule for Disposal {
    fn target(&self, _boundary_x: i32, grid: &Grid) -> DeliveryTarget {
        DeliveryTarget::Cell(grid.disposal())
    }

    fn outcome(&self, _carried: WasteKind) -> DeliveryOutcome {
        DeliveryOutcome::Dispose
    }
}
