//! Lane mode of a four-lane port group.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Number of physical lanes in a port group.
pub const LANES_PER_GROUP: usize = 4;

/// How the four lanes of a port group are split between its ports.
///
/// Modes are ordered by how many lanes each port claims: `Single < Dual <
/// Quad`, so the *smallest* mode is the most demanding one. The order comes
/// from [`LaneMode::rank`], not from declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LaneMode {
    /// One port uses all four lanes.
    Single,
    /// Two ports (lanes 0 and 2) use two lanes each.
    Dual,
    /// Up to four ports use one lane each.
    Quad,
}

impl LaneMode {
    /// Position in the "most lanes per port first" order.
    pub const fn rank(&self) -> u8 {
        match self {
            LaneMode::Single => 0,
            LaneMode::Dual => 1,
            LaneMode::Quad => 2,
        }
    }

    /// Lanes claimed by each active port, which is also the active lane
    /// count hardware reports for the controlling port.
    pub const fn lanes_per_port(&self) -> u32 {
        match self {
            LaneMode::Single => 4,
            LaneMode::Dual => 2,
            LaneMode::Quad => 1,
        }
    }

    /// Maps a hardware active-lane count to a lane mode.
    pub const fn from_active_lanes(lanes: u32) -> Option<Self> {
        match lanes {
            1 => Some(LaneMode::Quad),
            2 => Some(LaneMode::Dual),
            4 => Some(LaneMode::Single),
            _ => None,
        }
    }

    /// Returns true if this mode needs more lanes per port than `other`.
    pub fn is_more_demanding_than(&self, other: LaneMode) -> bool {
        self.rank() < other.rank()
    }

    /// Returns true if a port at `lane` may be enabled in this mode.
    pub const fn allows_lane(&self, lane: usize) -> bool {
        match self {
            LaneMode::Single => lane == 0,
            LaneMode::Dual => lane == 0 || lane == 2,
            LaneMode::Quad => lane < LANES_PER_GROUP,
        }
    }
}

impl PartialOrd for LaneMode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LaneMode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for LaneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneMode::Single => write!(f, "SINGLE"),
            LaneMode::Dual => write!(f, "DUAL"),
            LaneMode::Quad => write!(f, "QUAD"),
        }
    }
}
