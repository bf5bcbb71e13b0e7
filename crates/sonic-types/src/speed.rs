//! Port speed definitions.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configured transmission rate of a switch port.
///
/// Discriminants are the rate in Mbps. [`PortSpeed::Default`] is the
/// "unspecified" sentinel: a port that has no speed configured carries it,
/// and it must never be used to size lanes.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PortSpeed {
    /// No speed configured.
    #[default]
    Default = 0,
    /// 1 Gigabit Ethernet.
    Gige = 1_000,
    /// 10 Gigabit Ethernet.
    Xg = 10_000,
    /// 20 Gigabit Ethernet.
    TwentyG = 20_000,
    /// 25 Gigabit Ethernet.
    TwentyFiveG = 25_000,
    /// 40 Gigabit Ethernet.
    FortyG = 40_000,
    /// 50 Gigabit Ethernet.
    FiftyG = 50_000,
    /// 100 Gigabit Ethernet.
    HundredG = 100_000,
}

impl PortSpeed {
    /// All configurable speeds, excluding the sentinel.
    pub const ALL: [PortSpeed; 7] = [
        PortSpeed::Gige,
        PortSpeed::Xg,
        PortSpeed::TwentyG,
        PortSpeed::TwentyFiveG,
        PortSpeed::FortyG,
        PortSpeed::FiftyG,
        PortSpeed::HundredG,
    ];

    /// Returns the speed in Mbps (0 for the sentinel).
    pub const fn as_mbps(&self) -> u32 {
        *self as u32
    }

    /// Returns true if this is the unspecified sentinel.
    pub const fn is_default(&self) -> bool {
        matches!(self, PortSpeed::Default)
    }

    /// Looks up a speed by its Mbps value.
    pub fn from_mbps(mbps: u32) -> Option<Self> {
        if mbps == 0 {
            return Some(PortSpeed::Default);
        }
        Self::ALL.iter().copied().find(|s| s.as_mbps() == mbps)
    }
}

impl fmt::Display for PortSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpeed::Default => write!(f, "default"),
            PortSpeed::Gige => write!(f, "1G"),
            other => write!(f, "{}G", other.as_mbps() / 1_000),
        }
    }
}

impl FromStr for PortSpeed {
    type Err = ParseError;

    /// Accepts "default", a Gbps value with a `G` suffix ("25G"), or a raw
    /// Mbps value ("25000").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("default") {
            return Ok(PortSpeed::Default);
        }

        let mbps = match trimmed
            .strip_suffix('G')
            .or_else(|| trimmed.strip_suffix('g'))
        {
            Some(gbps) => gbps.parse::<u32>().ok().and_then(|g| g.checked_mul(1_000)),
            None => trimmed.parse::<u32>().ok(),
        };

        mbps.and_then(PortSpeed::from_mbps)
            .ok_or_else(|| ParseError::InvalidPortSpeed(s.to_string()))
    }
}

impl TryFrom<String> for PortSpeed {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PortSpeed> for String {
    fn from(speed: PortSpeed) -> Self {
        speed.to_string()
    }
}
