//! Zone map
//!
//! The grid is split into three contiguous, equal-width bands along x.
//! Comparisons are done in integers: `3x < w` is zone 1, `3x < 2w` is zone 2,
//! everything east of that is zone 3.

use crate::models::Position;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Z1,
    Z2,
    Z3,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Z1, Zone::Z2, Zone::Z3];

    pub const fn label(self) -> &'static str {
        match self {
            Zone::Z1 => "z1",
            Zone::Z2 => "z2",
            Zone::Z3 => "z3",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derives zones from x-coordinates for a grid of a given width
///
/// # Example
/// ```
/// use robot_mission_core_rs::{Position, Zone, ZoneMap};
///
/// let zones = ZoneMap::new(9);
/// assert_eq!(zones.zone_of(Position::new(2, 0)), Zone::Z1);
/// assert_eq!(zones.zone_of(Position::new(3, 0)), Zone::Z2);
/// assert_eq!(zones.eastern_edge(Zone::Z1), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneMap {
    width: i32,
}

impl ZoneMap {
    pub fn new(width: i32) -> Self {
        Self { width }
    }

    pub fn zone_of(&self, pos: Position) -> Zone {
        self.zone_of_x(pos.x)
    }

    pub fn zone_of_x(&self, x: i32) -> Zone {
        let scaled = 3 * x as i64;
        let w = self.width as i64;
        if scaled < w {
            Zone::Z1
        } else if scaled < 2 * w {
            Zone::Z2
        } else {
            Zone::Z3
        }
    }

    /// First column belonging to `zone`.
    pub fn western_edge(&self, zone: Zone) -> i32 {
        match zone {
            Zone::Z1 => 0,
            Zone::Z2 => self.end_exclusive(Zone::Z1),
            Zone::Z3 => self.end_exclusive(Zone::Z2),
        }
    }

    /// Last column belonging to `zone`.
    pub fn eastern_edge(&self, zone: Zone) -> i32 {
        self.end_exclusive(zone) - 1
    }

    fn end_exclusive(&self, zone: Zone) -> i32 {
        let w = self.width as i64;
        let end = match zone {
            Zone::Z1 => (w + 2) / 3,
            Zone::Z2 => (2 * w + 2) / 3,
            Zone::Z3 => w,
        };
        end as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_width_nine() {
        let zones = ZoneMap::new(9);
        let labels: Vec<Zone> = (0..9).map(|x| zones.zone_of_x(x)).collect();
        assert_eq!(
            labels,
            vec![
                Zone::Z1, Zone::Z1, Zone::Z1,
                Zone::Z2, Zone::Z2, Zone::Z2,
                Zone::Z3, Zone::Z3, Zone::Z3,
            ]
        );
        assert_eq!(zones.western_edge(Zone::Z2), 3);
        assert_eq!(zones.eastern_edge(Zone::Z2), 5);
        assert_eq!(zones.eastern_edge(Zone::Z3), 8);
    }

    #[test]
    fn test_edges_agree_with_zone_of_for_uneven_widths() {
        for width in 3..40 {
            let zones = ZoneMap::new(width);
            for zone in Zone::ALL {
                let west = zones.western_edge(zone);
                let east = zones.eastern_edge(zone);
                assert_eq!(zones.zone_of_x(west), zone, "width {width} zone {zone}");
                assert_eq!(zones.zone_of_x(east), zone, "width {width} zone {zone}");
                if east + 1 < width {
                    assert_ne!(zones.zone_of_x(east + 1), zone);
                }
            }
        }
    }
}
