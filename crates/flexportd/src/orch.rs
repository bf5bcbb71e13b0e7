//! Switch-wide port-group table.
//!
//! FlexPortOrch holds every port group on the switch keyed by controlling
//! port and pushes each new [`SwitchState`] through them.
//!
//! Key responsibilities:
//! - Reject a state up front when any group cannot realise it
//! - Reconfigure groups in controlling-port order
//! - Re-run the full sequence on groups a hardware error left half done
//! - Keep counters of applies, reconfigurations and failures

use std::collections::{BTreeMap, BTreeSet};

use sonic_types::PortId;
use tracing::{debug, error, info, warn};

use crate::error::{FlexPortError, Result};
use crate::port_group::{GroupMember, LaneControl, LaneMode, PortGroup};
use crate::state::SwitchState;

#[derive(Debug, Clone)]
pub struct FlexPortOrchConfig {
    /// Check every group before any hardware is touched.
    pub validate_before_apply: bool,
}

impl Default for FlexPortOrchConfig {
    fn default() -> Self {
        Self {
            validate_before_apply: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexPortOrchStats {
    pub applies: u64,
    pub reconfigurations: u64,
    pub rejected_states: u64,
    pub hardware_errors: u64,
}

/// Outcome of a successful [`FlexPortOrch::apply_state`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Controlling ports of groups whose lane mode changed or that were
    /// resynchronised after an earlier hardware error.
    pub reconfigured: Vec<PortId>,
    /// Number of groups already in the desired mode.
    pub unchanged: usize,
}

impl ApplySummary {
    /// Returns true if no group was touched.
    pub fn is_noop(&self) -> bool {
        self.reconfigured.is_empty()
    }
}

pub struct FlexPortOrch<P, H> {
    config: FlexPortOrchConfig,
    stats: FlexPortOrchStats,
    groups: BTreeMap<PortId, PortGroup<P, H>>,
    /// Groups whose last sequence failed in hardware.
    pending_resync: BTreeSet<PortId>,
}

impl<P, H> FlexPortOrch<P, H>
where
    P: GroupMember,
    H: LaneControl,
{
    pub fn new(config: FlexPortOrchConfig) -> Self {
        Self {
            config,
            stats: FlexPortOrchStats::default(),
            groups: BTreeMap::new(),
            pending_resync: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &FlexPortOrchConfig {
        &self.config
    }

    pub fn stats(&self) -> &FlexPortOrchStats {
        &self.stats
    }

    // ===== Group Management =====

    /// Registers a port group under its controlling port.
    pub fn add_group(&mut self, group: PortGroup<P, H>) -> Result<()> {
        let id = group.controlling_port().port_id();
        if self.groups.contains_key(&id) {
            return Err(FlexPortError::DuplicateGroup { port: id });
        }

        debug!("Added port group {} ({})", id, group.lane_mode());
        self.groups.insert(id, group);
        Ok(())
    }

    /// Looks up a group by controlling port.
    pub fn group(&self, controlling_port: PortId) -> Option<&PortGroup<P, H>> {
        self.groups.get(&controlling_port)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Current lane mode of every group, by controlling port.
    pub fn lane_modes(&self) -> BTreeMap<PortId, LaneMode> {
        self.groups
            .iter()
            .map(|(id, group)| (*id, group.lane_mode()))
            .collect()
    }

    /// Controlling ports of groups that will be fully reprogrammed on the
    /// next apply.
    pub fn pending_resync(&self) -> Vec<PortId> {
        self.pending_resync.iter().copied().collect()
    }

    // ===== State Application =====

    /// Controlling ports of the groups that reject `state`.
    fn invalid_groups(&self, state: &SwitchState) -> Vec<PortId> {
        self.groups
            .iter()
            .filter(|(_, group)| !group.is_valid_configuration(state))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns true if every group can realise `state`.
    pub fn is_valid_state(&self, state: &SwitchState) -> bool {
        let invalid = self.invalid_groups(state);
        if !invalid.is_empty() {
            warn!("Switch state rejected by port groups {:?}", invalid);
        }
        invalid.is_empty()
    }

    /// Moves every group to the lane mode `state` needs.
    ///
    /// A group that hit a hardware error on an earlier apply runs the whole
    /// disable, set lanes, enable sequence again even when its recorded mode
    /// already matches, and leaves the resync set only once that succeeds.
    ///
    /// # Errors
    ///
    /// - [`FlexPortError::InvalidState`] if validation is enabled and any
    ///   group rejects `state`; hardware is untouched.
    /// - The first error a group returns; groups after it are not visited.
    pub fn apply_state(&mut self, state: &SwitchState) -> Result<ApplySummary> {
        self.stats.applies += 1;

        if self.config.validate_before_apply {
            let invalid = self.invalid_groups(state);
            if !invalid.is_empty() {
                self.stats.rejected_states += 1;
                warn!("Refusing switch state, invalid port groups {:?}", invalid);
                return Err(FlexPortError::InvalidState { groups: invalid });
            }
        }

        let mut summary = ApplySummary::default();
        for (id, group) in self.groups.iter_mut() {
            let outcome = if self.pending_resync.contains(id) {
                info!("Resynchronising port group {}", id);
                group.force_reconfigure(state).map(|_| true)
            } else {
                group.reconfigure_if_needed(state)
            };

            match outcome {
                Ok(true) => {
                    self.pending_resync.remove(id);
                    self.stats.reconfigurations += 1;
                    summary.reconfigured.push(*id);
                }
                Ok(false) => summary.unchanged += 1,
                Err(e) => {
                    if e.is_hardware() {
                        self.pending_resync.insert(*id);
                        self.stats.hardware_errors += 1;
                        error!("Port group {} failed to reconfigure: {}", id, e);
                    } else {
                        self.stats.rejected_states += 1;
                        warn!("Port group {} rejected switch state: {}", id, e);
                    }
                    return Err(e);
                }
            }
        }

        if !summary.is_noop() {
            info!(
                "Applied switch state: {} group(s) reconfigured, {} unchanged",
                summary.reconfigured.len(),
                summary.unchanged
            );
        }
        Ok(summary)
    }
}
