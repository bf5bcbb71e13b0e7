//! The port-group lane manager.
//!
//! A [`PortGroup`] decides which [`LaneMode`] its four member ports need for
//! a given [`SwitchState`] and, when that differs from what hardware runs,
//! walks the flex-port sequence:
//!
//! ```text
//!   disable all members ──> set lane count on controlling port ──> enable members that are up
//! ```
//!
//! The order follows the SDK flex-port procedure. Disabling a member also
//! takes it out of counter-DMA and linkscan, and enabling puts it back; both
//! happen inside the [`GroupMember`] implementation.

use std::sync::Arc;

use sonic_types::{HwPortId, PortSpeed};
use tracing::{debug, info, instrument};

use super::member::{GroupMember, LaneControl};
use super::types::{LaneMode, LANES_PER_GROUP};
use crate::error::{FlexPortError, Result};
use crate::state::{PortState, SwitchState};

/// Returns the least demanding lane mode that can carry `speed` when one lane
/// runs at most `max_lane_speed`.
///
/// # Errors
///
/// - [`FlexPortError::UnspecifiedSpeed`] if either speed is the sentinel.
/// - [`FlexPortError::LaneCapacityExceeded`] if more than four lanes are needed.
pub fn needed_lane_mode_for_speed(speed: PortSpeed, max_lane_speed: PortSpeed) -> Result<LaneMode> {
    if speed.is_default() || max_lane_speed.is_default() {
        return Err(FlexPortError::UnspecifiedSpeed);
    }

    let lanes = speed.as_mbps() / max_lane_speed.as_mbps();
    match lanes {
        0 | 1 => Ok(LaneMode::Quad),
        2 => Ok(LaneMode::Dual),
        3 | 4 => Ok(LaneMode::Single),
        _ => Err(FlexPortError::LaneCapacityExceeded {
            speed,
            max_lane_speed,
            lanes,
        }),
    }
}

/// Reduces per-port lane requirements to one group-wide lane mode.
///
/// `ports` is indexed by lane. Disabled ports never constrain the result.
/// Every enabled port must sit on a lane the resulting mode leaves active:
/// lane 0 only for `Single`, lanes 0 and 2 for `Dual`.
pub fn calculate_desired_lane_mode(
    ports: &[PortState],
    max_lane_speed: PortSpeed,
) -> Result<LaneMode> {
    let mut desired = LaneMode::Quad;

    for (lane, port) in ports.iter().enumerate() {
        if port.is_disabled() {
            continue;
        }

        let needed = needed_lane_mode_for_speed(port.speed, max_lane_speed)?;
        if needed.is_more_demanding_than(desired) {
            desired = needed;
        }

        if !desired.allows_lane(lane) {
            return Err(FlexPortError::LanePlacement {
                lane,
                mode: desired,
            });
        }

        debug!(
            "Port {} on lane {} enabled with speed {}",
            port.id, lane, port.speed
        );
    }

    // A later port can demand a wider mode than an earlier enabled lane allows.
    if let Some(lane) = ports
        .iter()
        .enumerate()
        .find(|(lane, port)| !port.is_disabled() && !desired.allows_lane(*lane))
        .map(|(lane, _)| lane)
    {
        return Err(FlexPortError::LanePlacement {
            lane,
            mode: desired,
        });
    }

    Ok(desired)
}

/// Four ports sharing one set of serdes lanes.
///
/// Members are shared handles; the group never owns their lifecycle and only
/// touches them through [`GroupMember`].
#[derive(Debug)]
pub struct PortGroup<P, H> {
    hw: Arc<H>,
    controlling_port: Arc<P>,
    members: [Arc<P>; LANES_PER_GROUP],
    lane_mode: LaneMode,
}

impl<P, H> PortGroup<P, H>
where
    P: GroupMember,
    H: LaneControl,
{
    /// Builds a port group and reads its current lane mode from hardware.
    ///
    /// `members` must hold exactly four ports ordered by lane, the first being
    /// `controlling_port`.
    ///
    /// # Errors
    ///
    /// Fails with a construction error if the member list is malformed or
    /// hardware reports an active lane count other than 1, 2 or 4, and with
    /// [`FlexPortError::Hardware`] if the lane count cannot be read.
    pub fn new(hw: Arc<H>, controlling_port: Arc<P>, members: Vec<Arc<P>>) -> Result<Self> {
        let members: [Arc<P>; LANES_PER_GROUP] =
            members
                .try_into()
                .map_err(|members: Vec<Arc<P>>| FlexPortError::GroupSize {
                    expected: LANES_PER_GROUP,
                    actual: members.len(),
                })?;

        if members[0].port_id() != controlling_port.port_id() {
            return Err(FlexPortError::ControllingPortMismatch {
                controlling: controlling_port.port_id(),
                first: members[0].port_id(),
            });
        }

        let base = controlling_port.hw_port_id();
        for (position, member) in members.iter().enumerate() {
            let offset = member.hw_port_id().offset_from(base);
            if offset != position as i64 {
                return Err(FlexPortError::LaneOrder {
                    port: member.port_id(),
                    position,
                    offset,
                });
            }
        }

        let lanes = hw.active_lanes(base)?;
        let lane_mode = LaneMode::from_active_lanes(lanes).ok_or(
            FlexPortError::UnexpectedActiveLanes {
                hw_port: base,
                lanes,
            },
        )?;

        debug!(
            "Port group {} created with {} active lanes ({})",
            base, lanes, lane_mode
        );

        Ok(Self {
            hw,
            controlling_port,
            members,
            lane_mode,
        })
    }

    /// Lane mode hardware is currently programmed with.
    pub fn lane_mode(&self) -> LaneMode {
        self.lane_mode
    }

    /// The lane-0 member that anchors the group.
    pub fn controlling_port(&self) -> &Arc<P> {
        &self.controlling_port
    }

    /// Hardware id of the controlling port.
    pub fn hw_port_id(&self) -> HwPortId {
        self.controlling_port.hw_port_id()
    }

    /// Members in lane order.
    pub fn members(&self) -> &[Arc<P>] {
        &self.members
    }

    /// Lane offset of `port` relative to the controlling port.
    pub fn lane_of(&self, port: &P) -> i64 {
        port.hw_port_id().offset_from(self.hw_port_id())
    }

    /// Resolves the lane mode `state` asks of this group.
    ///
    /// Each member's configured speed must be supported by that port, whether
    /// or not it is enabled. An unset speed is unsupported on an enabled port
    /// and ignored on a disabled one.
    pub fn desired_lane_mode(&self, state: &SwitchState) -> Result<LaneMode> {
        self.resolve(state).map(|(mode, _)| mode)
    }

    fn resolve(&self, state: &SwitchState) -> Result<(LaneMode, Vec<PortState>)> {
        let mut ports = Vec::with_capacity(LANES_PER_GROUP);
        for member in &self.members {
            let port = state.port(member.port_id())?;
            let unsupported = if port.speed.is_default() {
                !port.is_disabled()
            } else {
                !member.supports_speed(port.speed)
            };
            if unsupported {
                return Err(FlexPortError::SpeedUnsupported {
                    port: port.id,
                    speed: port.speed,
                });
            }
            ports.push(*port);
        }

        let mode = calculate_desired_lane_mode(&ports, self.controlling_port.max_lane_speed())?;
        Ok((mode, ports))
    }

    /// Returns true if `state` can be realised by this group.
    ///
    /// Never fails; the reason for a `false` is logged.
    pub fn is_valid_configuration(&self, state: &SwitchState) -> bool {
        match self.desired_lane_mode(state) {
            Ok(_) => true,
            Err(e) => {
                debug!(
                    "Port group {} rejected state while determining lane mode: {}",
                    self.hw_port_id(),
                    e
                );
                false
            }
        }
    }

    /// Moves hardware to the lane mode `state` needs.
    ///
    /// Returns `Ok(false)` without touching hardware when the group already
    /// runs the desired mode. Resolution errors are returned before any
    /// hardware call. A hardware error aborts the sequence where it happened
    /// and may leave members disabled.
    pub fn reconfigure_if_needed(&mut self, state: &SwitchState) -> Result<bool> {
        let (desired, ports) = self.resolve(state)?;
        if desired == self.lane_mode {
            return Ok(false);
        }

        self.reconfigure(&ports, desired)?;
        Ok(true)
    }

    /// Runs the full flex-port sequence for `state` even if the recorded mode
    /// already matches, and returns the mode hardware ends up in.
    ///
    /// Used to bring members back after an earlier sequence failed part way,
    /// when the recorded mode no longer tells which ports are really up.
    pub fn force_reconfigure(&mut self, state: &SwitchState) -> Result<LaneMode> {
        let (desired, ports) = self.resolve(state)?;
        self.reconfigure(&ports, desired)?;
        Ok(desired)
    }

    #[instrument(skip(self, ports), fields(group = %self.hw_port_id(), from = %self.lane_mode))]
    fn reconfigure(&mut self, ports: &[PortState], new_mode: LaneMode) -> Result<()> {
        info!(
            "Reconfiguring port group {} from {} to {}",
            self.hw_port_id(),
            self.lane_mode,
            new_mode
        );

        for (member, port) in self.members.iter().zip(ports) {
            member.disable(port)?;
        }

        self.hw.set_active_lanes(self.hw_port_id(), new_mode)?;
        self.lane_mode = new_mode;

        for (member, port) in self.members.iter().zip(ports) {
            if !port.is_disabled() {
                member.enable(port)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{AsicOp, SimPort, SimulatedAsic};
    use pretty_assertions::assert_eq;
    use sonic_types::PortId;

    fn ports(speeds: [(PortSpeed, bool); 4]) -> Vec<PortState> {
        speeds
            .iter()
            .enumerate()
            .map(|(lane, (speed, enabled))| {
                let id = PortId(lane as u32 + 1);
                if *enabled {
                    PortState::enabled(id, *speed)
                } else {
                    PortState::disabled(id, *speed)
                }
            })
            .collect()
    }

    fn build_group(
        initial_lanes: u32,
    ) -> (Arc<SimulatedAsic>, PortGroup<SimPort, SimulatedAsic>) {
        build_group_at(initial_lanes, PortSpeed::TwentyFiveG)
    }

    fn build_group_at(
        initial_lanes: u32,
        max_lane_speed: PortSpeed,
    ) -> (Arc<SimulatedAsic>, PortGroup<SimPort, SimulatedAsic>) {
        let asic = Arc::new(SimulatedAsic::new());
        asic.set_active_lanes_raw(HwPortId(10), initial_lanes);
        let members: Vec<Arc<SimPort>> = (0..4u32)
            .map(|lane| {
                Arc::new(asic.port(
                    PortId(lane + 1),
                    HwPortId(10 + lane),
                    max_lane_speed,
                    &[PortSpeed::TwentyFiveG, PortSpeed::FiftyG, PortSpeed::HundredG],
                ))
            })
            .collect();
        let group = PortGroup::new(asic.clone(), members[0].clone(), members).unwrap();
        (asic, group)
    }

    #[test]
    fn test_needed_lane_mode_for_speed() {
        let max = PortSpeed::TwentyFiveG;
        assert_eq!(needed_lane_mode_for_speed(PortSpeed::Xg, max), Ok(LaneMode::Quad));
        assert_eq!(needed_lane_mode_for_speed(PortSpeed::TwentyFiveG, max), Ok(LaneMode::Quad));
        assert_eq!(needed_lane_mode_for_speed(PortSpeed::FortyG, max), Ok(LaneMode::Quad));
        assert_eq!(needed_lane_mode_for_speed(PortSpeed::FiftyG, max), Ok(LaneMode::Dual));
        assert_eq!(needed_lane_mode_for_speed(PortSpeed::HundredG, max), Ok(LaneMode::Single));
        assert_eq!(
            needed_lane_mode_for_speed(PortSpeed::FortyG, PortSpeed::Xg),
            Ok(LaneMode::Single)
        );
    }

    #[test]
    fn test_needed_lane_mode_errors() {
        assert_eq!(
            needed_lane_mode_for_speed(PortSpeed::Default, PortSpeed::TwentyFiveG),
            Err(FlexPortError::UnspecifiedSpeed)
        );
        assert_eq!(
            needed_lane_mode_for_speed(PortSpeed::HundredG, PortSpeed::Default),
            Err(FlexPortError::UnspecifiedSpeed)
        );
        assert_eq!(
            needed_lane_mode_for_speed(PortSpeed::HundredG, PortSpeed::TwentyG),
            Err(FlexPortError::LaneCapacityExceeded {
                speed: PortSpeed::HundredG,
                max_lane_speed: PortSpeed::TwentyG,
                lanes: 5,
            })
        );
    }

    #[test]
    fn test_all_disabled_is_quad() {
        let all_off = ports([
            (PortSpeed::HundredG, false),
            (PortSpeed::HundredG, false),
            (PortSpeed::Default, false),
            (PortSpeed::FiftyG, false),
        ]);
        assert_eq!(
            calculate_desired_lane_mode(&all_off, PortSpeed::TwentyFiveG),
            Ok(LaneMode::Quad)
        );
    }

    #[test]
    fn test_most_demanding_port_wins() {
        let dual = ports([
            (PortSpeed::TwentyFiveG, true),
            (PortSpeed::TwentyFiveG, false),
            (PortSpeed::FiftyG, true),
            (PortSpeed::TwentyFiveG, false),
        ]);
        assert_eq!(
            calculate_desired_lane_mode(&dual, PortSpeed::TwentyFiveG),
            Ok(LaneMode::Dual)
        );
    }

    #[test]
    fn test_single_rejects_other_lanes() {
        let conflicting = ports([
            (PortSpeed::HundredG, true),
            (PortSpeed::TwentyFiveG, true),
            (PortSpeed::TwentyFiveG, false),
            (PortSpeed::TwentyFiveG, false),
        ]);
        assert_eq!(
            calculate_desired_lane_mode(&conflicting, PortSpeed::TwentyFiveG),
            Err(FlexPortError::LanePlacement {
                lane: 1,
                mode: LaneMode::Single,
            })
        );
    }

    #[test]
    fn test_dual_demand_after_enabled_odd_lane() {
        let conflicting = ports([
            (PortSpeed::TwentyFiveG, false),
            (PortSpeed::TwentyFiveG, true),
            (PortSpeed::FiftyG, true),
            (PortSpeed::TwentyFiveG, false),
        ]);
        assert_eq!(
            calculate_desired_lane_mode(&conflicting, PortSpeed::TwentyFiveG),
            Err(FlexPortError::LanePlacement {
                lane: 1,
                mode: LaneMode::Dual,
            })
        );
    }

    #[test]
    fn test_dual_rejects_enabled_lane_three() {
        let conflicting = ports([
            (PortSpeed::FiftyG, true),
            (PortSpeed::TwentyFiveG, false),
            (PortSpeed::TwentyFiveG, false),
            (PortSpeed::TwentyFiveG, true),
        ]);
        assert_eq!(
            calculate_desired_lane_mode(&conflicting, PortSpeed::TwentyFiveG),
            Err(FlexPortError::LanePlacement {
                lane: 3,
                mode: LaneMode::Dual,
            })
        );
    }

    #[test]
    fn test_dual_rejects_enabled_lane_one() {
        // Lane 0 already demands DUAL when lane 1 is reached.
        let conflicting = ports([
            (PortSpeed::FiftyG, true),
            (PortSpeed::TwentyFiveG, true),
            (PortSpeed::TwentyFiveG, false),
            (PortSpeed::TwentyFiveG, false),
        ]);
        assert_eq!(
            calculate_desired_lane_mode(&conflicting, PortSpeed::TwentyFiveG),
            Err(FlexPortError::LanePlacement {
                lane: 1,
                mode: LaneMode::Dual,
            })
        );
    }

    #[test]
    fn test_group_speed_beyond_four_lanes() {
        let (asic, mut group) = build_group_at(1, PortSpeed::TwentyG);
        let state = SwitchState::new()
            .with_port(PortState::enabled(PortId(1), PortSpeed::HundredG))
            .with_port(PortState::disabled(PortId(2), PortSpeed::TwentyFiveG))
            .with_port(PortState::disabled(PortId(3), PortSpeed::TwentyFiveG))
            .with_port(PortState::disabled(PortId(4), PortSpeed::TwentyFiveG));

        let err = group.desired_lane_mode(&state).unwrap_err();
        assert_eq!(
            err,
            FlexPortError::LaneCapacityExceeded {
                speed: PortSpeed::HundredG,
                max_lane_speed: PortSpeed::TwentyG,
                lanes: 5,
            }
        );
        assert!(err.is_invalid_configuration());
        assert!(!group.is_valid_configuration(&state));
        assert!(group.reconfigure_if_needed(&state).is_err());
        assert!(asic.journal().is_empty());
    }

    #[test]
    fn test_construction_reads_lane_mode() {
        assert_eq!(build_group(1).1.lane_mode(), LaneMode::Quad);
        assert_eq!(build_group(2).1.lane_mode(), LaneMode::Dual);
        assert_eq!(build_group(4).1.lane_mode(), LaneMode::Single);
    }

    #[test]
    fn test_construction_rejects_bad_lane_count() {
        let asic = Arc::new(SimulatedAsic::new());
        asic.set_active_lanes_raw(HwPortId(10), 3);
        let members: Vec<Arc<SimPort>> = (0..4u32)
            .map(|lane| {
                Arc::new(asic.port(
                    PortId(lane),
                    HwPortId(10 + lane),
                    PortSpeed::TwentyFiveG,
                    &[],
                ))
            })
            .collect();

        let err = PortGroup::new(asic.clone(), members[0].clone(), members).unwrap_err();
        assert_eq!(
            err,
            FlexPortError::UnexpectedActiveLanes {
                hw_port: HwPortId(10),
                lanes: 3,
            }
        );
    }

    #[test]
    fn test_construction_rejects_misordered_members() {
        let asic = Arc::new(SimulatedAsic::new());
        asic.set_active_lanes_raw(HwPortId(10), 1);
        let mut members: Vec<Arc<SimPort>> = (0..4u32)
            .map(|lane| {
                Arc::new(asic.port(
                    PortId(lane),
                    HwPortId(10 + lane),
                    PortSpeed::TwentyFiveG,
                    &[],
                ))
            })
            .collect();
        members.swap(1, 2);

        let err = PortGroup::new(asic.clone(), members[0].clone(), members).unwrap_err();
        assert_eq!(
            err,
            FlexPortError::LaneOrder {
                port: PortId(2),
                position: 1,
                offset: 2,
            }
        );
        assert!(err.is_construction());
    }

    #[test]
    fn test_construction_rejects_foreign_controlling_port() {
        let asic = Arc::new(SimulatedAsic::new());
        asic.set_active_lanes_raw(HwPortId(10), 1);
        let members: Vec<Arc<SimPort>> = (0..4u32)
            .map(|lane| {
                Arc::new(asic.port(
                    PortId(lane + 1),
                    HwPortId(10 + lane),
                    PortSpeed::TwentyFiveG,
                    &[],
                ))
            })
            .collect();
        // Same hardware port as lane 0, different logical port.
        let controlling = Arc::new(asic.port(
            PortId(9),
            HwPortId(10),
            PortSpeed::TwentyFiveG,
            &[],
        ));

        let err = PortGroup::new(asic.clone(), controlling, members).unwrap_err();
        assert_eq!(
            err,
            FlexPortError::ControllingPortMismatch {
                controlling: PortId(9),
                first: PortId(1),
            }
        );
        assert!(err.is_construction());
    }

    #[test]
    fn test_construction_rejects_wrong_size() {
        let asic = Arc::new(SimulatedAsic::new());
        asic.set_active_lanes_raw(HwPortId(10), 1);
        let members: Vec<Arc<SimPort>> = (0..3u32)
            .map(|lane| {
                Arc::new(asic.port(
                    PortId(lane),
                    HwPortId(10 + lane),
                    PortSpeed::TwentyFiveG,
                    &[],
                ))
            })
            .collect();

        let err = PortGroup::new(asic.clone(), members[0].clone(), members).unwrap_err();
        assert_eq!(
            err,
            FlexPortError::GroupSize {
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_lane_of() {
        let (_asic, group) = build_group(1);
        let lanes: Vec<i64> = group.members().iter().map(|m| group.lane_of(m)).collect();
        assert_eq!(lanes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unsupported_speed_on_disabled_port() {
        let (_asic, group) = build_group(1);
        let state = SwitchState::new()
            .with_port(PortState::enabled(PortId(1), PortSpeed::TwentyFiveG))
            .with_port(PortState::disabled(PortId(2), PortSpeed::Xg))
            .with_port(PortState::disabled(PortId(3), PortSpeed::TwentyFiveG))
            .with_port(PortState::disabled(PortId(4), PortSpeed::TwentyFiveG));

        assert_eq!(
            group.desired_lane_mode(&state),
            Err(FlexPortError::SpeedUnsupported {
                port: PortId(2),
                speed: PortSpeed::Xg,
            })
        );
        assert!(!group.is_valid_configuration(&state));
    }

    #[test]
    fn test_resolution_error_leaves_hardware_untouched() {
        let (asic, mut group) = build_group(1);
        let state = SwitchState::new()
            .with_port(PortState::disabled(PortId(1), PortSpeed::TwentyFiveG))
            .with_port(PortState::enabled(PortId(2), PortSpeed::HundredG))
            .with_port(PortState::disabled(PortId(3), PortSpeed::TwentyFiveG))
            .with_port(PortState::disabled(PortId(4), PortSpeed::TwentyFiveG));

        assert!(group.reconfigure_if_needed(&state).is_err());
        assert_eq!(asic.journal(), Vec::<AsicOp>::new());
        assert_eq!(group.lane_mode(), LaneMode::Quad);
    }

    #[test]
    fn test_force_reconfigure_runs_full_sequence() {
        let (asic, mut group) = build_group(1);
        let state = SwitchState::new()
            .with_port(PortState::enabled(PortId(1), PortSpeed::TwentyFiveG))
            .with_port(PortState::disabled(PortId(2), PortSpeed::TwentyFiveG))
            .with_port(PortState::disabled(PortId(3), PortSpeed::TwentyFiveG))
            .with_port(PortState::disabled(PortId(4), PortSpeed::TwentyFiveG));

        assert_eq!(group.reconfigure_if_needed(&state), Ok(false));
        assert_eq!(group.force_reconfigure(&state), Ok(LaneMode::Quad));
        assert_eq!(
            asic.journal(),
            vec![
                AsicOp::Disable(HwPortId(10)),
                AsicOp::Disable(HwPortId(11)),
                AsicOp::Disable(HwPortId(12)),
                AsicOp::Disable(HwPortId(13)),
                AsicOp::SetLanes(HwPortId(10), LaneMode::Quad),
                AsicOp::Enable(HwPortId(10), PortSpeed::TwentyFiveG),
            ]
        );
    }
}
