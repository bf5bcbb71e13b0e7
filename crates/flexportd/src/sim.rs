//! Simulated ASIC backend.
//!
//! [`SimulatedAsic`] stands in for the SDK when no hardware is attached. It
//! keeps per-port enable state, linkscan and counter-DMA membership and the
//! lane-control registers, and journals every mutating call in order so the
//! flex-port sequence can be checked step by step.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sonic_sai::{SaiError, SaiResult};
use sonic_types::{HwPortId, PortId, PortSpeed};
use tracing::debug;

use crate::port_group::{GroupMember, LaneControl, LaneMode};
use crate::state::PortState;

/// A mutating hardware call recorded by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsicOp {
    Disable(HwPortId),
    Enable(HwPortId, PortSpeed),
    SetLanes(HwPortId, LaneMode),
}

/// Hardware calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    ReadLanes,
    SetLanes,
    Disable,
    Enable,
}

#[derive(Debug, Default)]
struct AsicState {
    active_lanes: BTreeMap<HwPortId, u32>,
    enabled: BTreeMap<HwPortId, PortSpeed>,
    linkscan: BTreeSet<HwPortId>,
    counter_dma: BTreeSet<HwPortId>,
    journal: Vec<AsicOp>,
    faults: HashSet<FaultPoint>,
}

impl AsicState {
    fn take_fault(&mut self, point: FaultPoint) -> SaiResult<()> {
        if self.faults.remove(&point) {
            return Err(SaiError::internal(format!("injected {:?} failure", point)));
        }
        Ok(())
    }
}

/// In-memory ASIC implementing [`LaneControl`].
#[derive(Debug, Default)]
pub struct SimulatedAsic {
    state: Mutex<AsicState>,
}

impl SimulatedAsic {
    /// Creates an ASIC with no lane groups programmed.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AsicState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a member port backed by this ASIC.
    pub fn port(
        self: &Arc<Self>,
        id: PortId,
        hw_port: HwPortId,
        max_lane_speed: PortSpeed,
        supported_speeds: &[PortSpeed],
    ) -> SimPort {
        SimPort {
            asic: Arc::clone(self),
            id,
            hw_port,
            max_lane_speed,
            supported_speeds: supported_speeds.to_vec(),
        }
    }

    /// Seeds a lane-control register, as the SDK does at boot. Not journaled.
    pub fn set_active_lanes_raw(&self, hw_port: HwPortId, lanes: u32) {
        self.lock().active_lanes.insert(hw_port, lanes);
    }

    /// Current raw lane count for `hw_port`.
    pub fn lanes(&self, hw_port: HwPortId) -> Option<u32> {
        self.lock().active_lanes.get(&hw_port).copied()
    }

    /// Makes the next call at `point` fail once.
    pub fn fail_next(&self, point: FaultPoint) {
        self.lock().faults.insert(point);
    }

    /// Returns true if `hw_port` is enabled.
    pub fn is_enabled(&self, hw_port: HwPortId) -> bool {
        self.lock().enabled.contains_key(&hw_port)
    }

    /// Speed an enabled port was brought up at.
    pub fn enabled_speed(&self, hw_port: HwPortId) -> Option<PortSpeed> {
        self.lock().enabled.get(&hw_port).copied()
    }

    /// Returns true if `hw_port` is in the linkscan bitmap.
    pub fn in_linkscan(&self, hw_port: HwPortId) -> bool {
        self.lock().linkscan.contains(&hw_port)
    }

    /// Returns true if `hw_port` is in the counter-DMA bitmap.
    pub fn in_counter_dma(&self, hw_port: HwPortId) -> bool {
        self.lock().counter_dma.contains(&hw_port)
    }

    /// Mutating calls made so far, oldest first.
    pub fn journal(&self) -> Vec<AsicOp> {
        self.lock().journal.clone()
    }

    /// Forgets recorded calls.
    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    fn disable_port(&self, hw_port: HwPortId) -> SaiResult<()> {
        let mut state = self.lock();
        state.take_fault(FaultPoint::Disable)?;
        state.enabled.remove(&hw_port);
        state.linkscan.remove(&hw_port);
        state.counter_dma.remove(&hw_port);
        state.journal.push(AsicOp::Disable(hw_port));
        debug!("Disabled {}", hw_port);
        Ok(())
    }

    fn enable_port(&self, hw_port: HwPortId, speed: PortSpeed) -> SaiResult<()> {
        let mut state = self.lock();
        state.take_fault(FaultPoint::Enable)?;
        state.enabled.insert(hw_port, speed);
        state.linkscan.insert(hw_port);
        state.counter_dma.insert(hw_port);
        state.journal.push(AsicOp::Enable(hw_port, speed));
        debug!("Enabled {} at {}", hw_port, speed);
        Ok(())
    }
}

impl LaneControl for SimulatedAsic {
    fn active_lanes(&self, hw_port: HwPortId) -> SaiResult<u32> {
        let mut state = self.lock();
        state.take_fault(FaultPoint::ReadLanes)?;
        state
            .active_lanes
            .get(&hw_port)
            .copied()
            .ok_or_else(|| SaiError::not_found(format!("lane control for {}", hw_port)))
    }

    fn set_active_lanes(&self, hw_port: HwPortId, mode: LaneMode) -> SaiResult<()> {
        let mut state = self.lock();
        state.take_fault(FaultPoint::SetLanes)?;
        state.active_lanes.insert(hw_port, mode.lanes_per_port());
        state.journal.push(AsicOp::SetLanes(hw_port, mode));
        debug!("Set {} to {}", hw_port, mode);
        Ok(())
    }
}

/// A port on a [`SimulatedAsic`].
#[derive(Debug)]
pub struct SimPort {
    asic: Arc<SimulatedAsic>,
    id: PortId,
    hw_port: HwPortId,
    max_lane_speed: PortSpeed,
    supported_speeds: Vec<PortSpeed>,
}

impl GroupMember for SimPort {
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
        self.asic.disable_port(self.hw_port)
    }

    fn enable(&self, port: &PortState) -> SaiResult<()> {
        self.asic.enable_port(self.hw_port, port.speed)
    }
}
