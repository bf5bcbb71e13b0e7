//! SAI-backed port group collaborators.
//!
//! [`SaiPort`] drives a member port through the SAI port API and
//! [`SaiLaneControl`] maps hardware port ids to port OIDs for lane-count
//! programming. Taking a port admin down in SAI also stops its stats
//! collection and link monitoring, so no separate calls are needed for those.

use std::collections::HashMap;
use std::sync::Arc;

use sonic_sai::api::PortApi;
use sonic_sai::{PortOid, SaiError, SaiResult};
use sonic_types::{HwPortId, PortId, PortSpeed};
use tracing::debug;

use crate::port_group::{GroupMember, LaneControl, LaneMode};
use crate::state::PortState;

/// A member port reached through SAI.
#[derive(Debug)]
pub struct SaiPort {
    api: Arc<PortApi>,
    oid: PortOid,
    id: PortId,
    hw_port: HwPortId,
    max_lane_speed: PortSpeed,
    supported_speeds: Vec<PortSpeed>,
}

impl SaiPort {
    pub fn new(
        api: Arc<PortApi>,
        oid: PortOid,
        id: PortId,
        hw_port: HwPortId,
        max_lane_speed: PortSpeed,
        supported_speeds: Vec<PortSpeed>,
    ) -> Self {
        Self {
            api,
            oid,
            id,
            hw_port,
            max_lane_speed,
            supported_speeds,
        }
    }

    /// Builds a port, reading its supported speeds from SAI.
    pub fn discover(
        api: Arc<PortApi>,
        oid: PortOid,
        id: PortId,
        hw_port: HwPortId,
        max_lane_speed: PortSpeed,
    ) -> SaiResult<Self> {
        let supported_speeds = api.get_supported_speeds(oid)?;
        Ok(Self::new(api, oid, id, hw_port, max_lane_speed, supported_speeds))
    }

    pub fn oid(&self) -> PortOid {
        self.oid
    }
}

impl GroupMember for SaiPort {
    fn port_id(&self) -> PortId {
        self.id
    }

    fn hw_port_id(&self) -> HwPortId {
        self.hw_port
    }

    fn max_lane_speed(&self) -> PortSpeed {
        self.max_lane_speed
    }

    fn supports_speed(&self, speed: PortSpeed) -> bool {
        self.supported_speeds.contains(&speed)
    }

    fn disable(&self, _port: &PortState) -> SaiResult<()> {
        debug!("Disabling {} ({})", self.id, self.oid);
        self.api.set_admin_state(self.oid, false)
    }

    fn enable(&self, port: &PortState) -> SaiResult<()> {
        debug!("Enabling {} ({}) at {}", self.id, self.oid, port.speed);
        self.api.set_speed(self.oid, port.speed)?;
        self.api.set_admin_state(self.oid, true)
    }
}

/// Lane-control register access through SAI.
#[derive(Debug)]
pub struct SaiLaneControl {
    api: Arc<PortApi>,
    oids: HashMap<HwPortId, PortOid>,
}

impl SaiLaneControl {
    pub fn new(api: Arc<PortApi>) -> Self {
        Self {
            api,
            oids: HashMap::new(),
        }
    }

    /// Maps a hardware port to its SAI object.
    pub fn register(&mut self, hw_port: HwPortId, oid: PortOid) {
        self.oids.insert(hw_port, oid);
    }

    fn oid(&self, hw_port: HwPortId) -> SaiResult<PortOid> {
        self.oids
            .get(&hw_port)
            .copied()
            .ok_or_else(|| SaiError::not_found(format!("no port object for {}", hw_port)))
    }
}

impl LaneControl for SaiLaneControl {
    fn active_lanes(&self, hw_port: HwPortId) -> SaiResult<u32> {
        self.api.get_active_lane_count(self.oid(hw_port)?)
    }

    fn set_active_lanes(&self, hw_port: HwPortId, mode: LaneMode) -> SaiResult<()> {
        self.api
            .set_active_lane_count(self.oid(hw_port)?, mode.lanes_per_port())
    }
}
