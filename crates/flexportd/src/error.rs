//! Error types for port-group lane management.
//!
//! Every failure in the crate is a [`FlexPortError`]. Variants fall into three
//! classes which callers treat differently:
//!
//! | Class | Variants | Raised by |
//! |-------|----------|-----------|
//! | Construction | `GroupSize`, `ControllingPortMismatch`, `LaneOrder`, `UnexpectedActiveLanes` | [`PortGroup::new`](crate::PortGroup::new) |
//! | Invalid configuration | `UnspecifiedSpeed`, `SpeedUnsupported`, `LaneCapacityExceeded`, `LanePlacement`, `PortNotInState` | lane-mode resolution |
//! | Hardware | `Hardware` | SAI / simulator calls during reconfiguration |

use sonic_sai::SaiError;
use sonic_types::{HwPortId, PortId, PortSpeed};
use thiserror::Error;

use crate::port_group::LaneMode;

/// Result type alias for flex-port operations.
pub type Result<T> = std::result::Result<T, FlexPortError>;

/// Errors raised while building, resolving or reconfiguring port groups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlexPortError {
    /// A port group was built with the wrong number of members.
    #[error("port groups must have exactly {expected} members, got {actual}")]
    GroupSize { expected: usize, actual: usize },

    /// The lane-0 member is not the controlling port.
    #[error("controlling port {controlling} is not the first member (found {first})")]
    ControllingPortMismatch { controlling: PortId, first: PortId },

    /// A member's hardware id does not match its lane position.
    #[error("port {port} is at position {position} but sits on lane offset {offset}")]
    LaneOrder {
        port: PortId,
        position: usize,
        offset: i64,
    },

    /// Hardware reported an active lane count that maps to no lane mode.
    #[error("unexpected number of active lanes ({lanes}) for {hw_port}")]
    UnexpectedActiveLanes { hw_port: HwPortId, lanes: u32 },

    /// A lane requirement was requested for the unspecified speed sentinel.
    #[error("speed cannot be {}", PortSpeed::Default)]
    UnspecifiedSpeed,

    /// The configured speed is not supported by the port hardware.
    #[error("port {port} does not support speed {speed}")]
    SpeedUnsupported { port: PortId, speed: PortSpeed },

    /// The speed needs more lanes than a port group has.
    #[error("cannot support speed {speed}: needs {lanes} lanes at {max_lane_speed} per lane")]
    LaneCapacityExceeded {
        speed: PortSpeed,
        max_lane_speed: PortSpeed,
        lanes: u32,
    },

    /// An enabled port occupies a lane the demanded mode leaves unused.
    #[error("lane {lane} cannot be enabled in {mode} mode")]
    LanePlacement { lane: usize, mode: LaneMode },

    /// The switch state has no entry for a group member.
    #[error("port {port} not found in switch state")]
    PortNotInState { port: PortId },

    /// Two groups were registered under the same controlling port.
    #[error("port group for controlling port {port} already exists")]
    DuplicateGroup { port: PortId },

    /// A switch state was rejected because some groups cannot realise it.
    #[error("switch state is invalid for port groups {groups:?}")]
    InvalidState { groups: Vec<PortId> },

    /// A hardware register or port call failed.
    #[error("hardware access failed: {0}")]
    Hardware(#[from] SaiError),
}

impl FlexPortError {
    /// Returns true for errors raised while building a port group.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            FlexPortError::GroupSize { .. }
                | FlexPortError::ControllingPortMismatch { .. }
                | FlexPortError::LaneOrder { .. }
                | FlexPortError::UnexpectedActiveLanes { .. }
        )
    }

    /// Returns true for errors meaning the requested configuration cannot be
    /// realised by the port group.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            FlexPortError::UnspecifiedSpeed
                | FlexPortError::SpeedUnsupported { .. }
                | FlexPortError::LaneCapacityExceeded { .. }
                | FlexPortError::LanePlacement { .. }
                | FlexPortError::PortNotInState { .. }
                | FlexPortError::InvalidState { .. }
        )
    }

    /// Returns true for errors propagated from the hardware accessor.
    pub fn is_hardware(&self) -> bool {
        matches!(self, FlexPortError::Hardware(_))
    }
}
