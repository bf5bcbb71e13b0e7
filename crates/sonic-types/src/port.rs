//! Port identity and administrative state.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical port identifier as used in the switch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub u32);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hardware (ASIC) port number.
///
/// Ports that share a lane group have consecutive hardware numbers starting
/// at the group's controlling port, so the offset from the controlling port
/// is the lane position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HwPortId(pub u32);

impl HwPortId {
    /// Returns the signed distance from `base` to this port.
    pub fn offset_from(&self, base: HwPortId) -> i64 {
        i64::from(self.0) - i64::from(base.0)
    }
}

impl fmt::Display for HwPortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hw{}", self.0)
    }
}

/// Administrative state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    /// Port is administratively down (default for new ports).
    #[default]
    #[serde(alias = "disabled")]
    Down,
    /// Port is administratively up.
    #[serde(alias = "enabled")]
    Up,
}

impl AdminState {
    /// Returns true if the port is administratively up.
    pub const fn is_up(&self) -> bool {
        matches!(self, AdminState::Up)
    }

    /// Returns true if the port is administratively down.
    pub const fn is_down(&self) -> bool {
        matches!(self, AdminState::Down)
    }
}

impl From<bool> for AdminState {
    fn from(enabled: bool) -> Self {
        if enabled {
            AdminState::Up
        } else {
            AdminState::Down
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminState::Up => write!(f, "up"),
            AdminState::Down => write!(f, "down"),
        }
    }
}

impl FromStr for AdminState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "enabled" => Ok(AdminState::Up),
            "down" | "disabled" => Ok(AdminState::Down),
            _ => Err(ParseError::InvalidAdminState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hw_port_offset() {
        assert_eq!(HwPortId(13).offset_from(HwPortId(10)), 3);
        assert_eq!(HwPortId(10).offset_from(HwPortId(10)), 0);
        assert_eq!(HwPortId(9).offset_from(HwPortId(10)), -1);
    }

    #[test]
    fn test_admin_state() {
        assert!(AdminState::Up.is_up());
        assert!(!AdminState::Up.is_down());
        assert!(AdminState::Down.is_down());
        assert_eq!(AdminState::from(true), AdminState::Up);
        assert_eq!(AdminState::default(), AdminState::Down);
    }

    #[test]
    fn test_admin_state_parse() {
        assert_eq!("UP".parse::<AdminState>().unwrap(), AdminState::Up);
        assert_eq!("disabled".parse::<AdminState>().unwrap(), AdminState::Down);
        assert!("sideways".parse::<AdminState>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(PortId(5).to_string(), "5");
        assert_eq!(HwPortId(34).to_string(), "hw34");
        assert_eq!(AdminState::Up.to_string(), "up");
    }
}
