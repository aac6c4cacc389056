//! Coarse geographic region labels derived from neighbourhood names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Region label for a neighbourhood.
///
/// `Other` is the fallback for any neighbourhood the zone table does not
/// know about, so every cleaned row carries a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    North,
    South,
    East,
    West,
    Central,
    Other,
}

impl Zone {
    /// All labels, in report order.
    pub const ALL: [Zone; 6] = [
        Zone::North,
        Zone::South,
        Zone::East,
        Zone::West,
        Zone::Central,
        Zone::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::North => "North",
            Zone::South => "South",
            Zone::East => "East",
            Zone::West => "West",
            Zone::Central => "Central",
            Zone::Other => "Other",
        }
    }

    /// True for the label assigned on a lookup miss.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Zone::Other)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::ALL
            .iter()
            .copied()
            .find(|z| z.as_str() == s)
            .ok_or_else(|| format!("unknown zone label '{}'", s))
    }
}
