//! Collaborator interfaces a port group drives.
//!
//! A [`PortGroup`](super::PortGroup) never talks to the SDK directly. Member
//! ports are reached through [`GroupMember`] and the shared lane-control
//! register through [`LaneControl`], so the same group logic runs against
//! SAI ([`crate::sai`]) or the simulator ([`crate::sim`]).

use sonic_sai::SaiResult;
use sonic_types::{HwPortId, PortId, PortSpeed};

use super::types::LaneMode;
use crate::state::PortState;

/// One member port of a port group.
///
/// Implementations own the per-port enable/disable sequence, including
/// adding and removing the port from counter-DMA and linkscan.
pub trait GroupMember {
    /// Logical id used to look the port up in a [`SwitchState`](crate::SwitchState).
    fn port_id(&self) -> PortId;

    /// ASIC port number.
    fn hw_port_id(&self) -> HwPortId;

    /// Highest speed a single lane of this port can carry.
    fn max_lane_speed(&self) -> PortSpeed;

    /// Returns true if the port hardware can run at `speed`.
    fn supports_speed(&self, speed: PortSpeed) -> bool;

    /// Disables the port and removes it from counter-DMA and linkscan.
    fn disable(&self, port: &PortState) -> SaiResult<()>;

    /// Enables the port with the given configuration and adds it back to
    /// counter-DMA and linkscan.
    fn enable(&self, port: &PortState) -> SaiResult<()>;
}

/// Access to the lane-control register of a port group.
///
/// The register is addressed by the group's controlling port. Callers
/// serialize all writes; implementations need no locking of their own.
pub trait LaneControl {
    /// Number of lanes currently active on `hw_port`.
    fn active_lanes(&self, hw_port: HwPortId) -> SaiResult<u32>;

    /// Programs the group anchored at `hw_port` into `mode`.
    fn set_active_lanes(&self, hw_port: HwPortId, mode: LaneMode) -> SaiResult<()>;
}
