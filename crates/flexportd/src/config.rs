//! YAML configuration for flexportd.
//!
//! A config file has two sections. `platform` describes the ports and how
//! they form lane groups, and is read once at startup. `state` holds the
//! per-port speed and admin status to apply, and may change while the
//! daemon runs.
//!
//! ```yaml
//! platform:
//!   ports:
//!     - { id: 1, hw_port: 0, max_lane_speed: "25G", supported_speeds: ["25G", "50G", "100G"] }
//!   groups:
//!     - { controlling_port: 1, members: [1, 2, 3, 4] }
//!   initial_lanes:
//!     0: 1
//! state:
//!   ports:
//!     - { id: 1, speed: "100G", admin_status: up }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sonic_types::{HwPortId, PortId, PortSpeed};
use thiserror::Error;
use tracing::debug;

use crate::error::FlexPortError;
use crate::orch::{FlexPortOrch, FlexPortOrchConfig};
use crate::port_group::{GroupMember, PortGroup, LANES_PER_GROUP};
use crate::sim::{SimPort, SimulatedAsic};
use crate::state::{PortState, SwitchState};

/// Default location of the config file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/flexportd.yaml";

/// Lane count a simulated group starts with when `initial_lanes` omits it.
const DEFAULT_INITIAL_LANES: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("port {0} is defined more than once")]
    DuplicatePort(PortId),

    #[error("{0} is used by more than one port")]
    DuplicateHwPort(HwPortId),

    #[error("port {0} has no max lane speed")]
    MissingMaxLaneSpeed(PortId),

    #[error("group {group} references unknown port {port}")]
    UnknownPort { group: PortId, port: PortId },

    #[error("group {group} has {actual} members, expected {}", LANES_PER_GROUP)]
    GroupSize { group: PortId, actual: usize },

    #[error("group {group} must list its controlling port first")]
    ControllingPortNotFirst { group: PortId },

    #[error("port {0} belongs to more than one group")]
    PortInMultipleGroups(PortId),

    #[error("state lists port {0} more than once")]
    DuplicateStatePort(PortId),

    #[error("failed to build port group: {0}")]
    Group(#[from] FlexPortError),
}

/// A physical port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    pub id: PortId,
    pub hw_port: HwPortId,
    pub max_lane_speed: PortSpeed,
    /// Empty means every concrete speed.
    #[serde(default)]
    pub supported_speeds: Vec<PortSpeed>,
}

impl PortConfig {
    /// Speeds the port hardware accepts.
    pub fn supported_speeds(&self) -> Vec<PortSpeed> {
        if self.supported_speeds.is_empty() {
            PortSpeed::ALL.to_vec()
        } else {
            self.supported_speeds.clone()
        }
    }
}

/// A lane group, members in lane order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub controlling_port: PortId,
    pub members: Vec<PortId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub ports: Vec<PortConfig>,

    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Active lanes each simulated group boots with, keyed by controlling
    /// hardware port.
    #[serde(default)]
    pub initial_lanes: BTreeMap<HwPortId, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default)]
    pub ports: Vec<PortState>,
}

/// Complete flexportd configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexPortConfig {
    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub state: StateConfig,
}

/// A simulated switch built from a platform description.
pub struct SimulatedSwitch {
    pub asic: Arc<SimulatedAsic>,
    pub orch: FlexPortOrch<SimPort, SimulatedAsic>,
}

impl FlexPortConfig {
    /// Parses a config from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Loads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Checks platform and state sections for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.platform.validate()?;

        let mut seen = HashSet::new();
        for port in &self.state.ports {
            if !seen.insert(port.id) {
                return Err(ConfigError::DuplicateStatePort(port.id));
            }
        }
        Ok(())
    }

    /// The desired switch state described by the `state` section.
    pub fn switch_state(&self) -> SwitchState {
        self.state.ports.iter().copied().collect()
    }
}

impl PlatformConfig {
    /// Checks port and group definitions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        let mut hw_ports = HashSet::new();
        for port in &self.ports {
            if !ids.insert(port.id) {
                return Err(ConfigError::DuplicatePort(port.id));
            }
            if !hw_ports.insert(port.hw_port) {
                return Err(ConfigError::DuplicateHwPort(port.hw_port));
            }
            if port.max_lane_speed.is_default() {
                return Err(ConfigError::MissingMaxLaneSpeed(port.id));
            }
        }

        let mut grouped = HashSet::new();
        for group in &self.groups {
            let id = group.controlling_port;
            if group.members.len() != LANES_PER_GROUP {
                return Err(ConfigError::GroupSize {
                    group: id,
                    actual: group.members.len(),
                });
            }
            if group.members.first() != Some(&id) {
                return Err(ConfigError::ControllingPortNotFirst { group: id });
            }
            for member in &group.members {
                if !ids.contains(member) {
                    return Err(ConfigError::UnknownPort {
                        group: id,
                        port: *member,
                    });
                }
                if !grouped.insert(*member) {
                    return Err(ConfigError::PortInMultipleGroups(*member));
                }
            }
        }
        Ok(())
    }

    /// Builds a simulated ASIC and every configured port group on it.
    ///
    /// Lane order of each group is checked by [`PortGroup::new`]; a group
    /// whose members are not on consecutive hardware ports fails here.
    pub fn build_simulated(
        &self,
        orch_config: FlexPortOrchConfig,
    ) -> Result<SimulatedSwitch, ConfigError> {
        self.validate()?;

        let asic = Arc::new(SimulatedAsic::new());
        let ports: HashMap<PortId, Arc<SimPort>> = self
            .ports
            .iter()
            .map(|p| {
                let port = asic.port(p.id, p.hw_port, p.max_lane_speed, &p.supported_speeds());
                (p.id, Arc::new(port))
            })
            .collect();

        let mut orch = FlexPortOrch::new(orch_config);
        for group in &self.groups {
            let controlling = ports.get(&group.controlling_port).cloned().ok_or(
                ConfigError::UnknownPort {
                    group: group.controlling_port,
                    port: group.controlling_port,
                },
            )?;
            let members: Vec<Arc<SimPort>> = group
                .members
                .iter()
                .filter_map(|id| ports.get(id).cloned())
                .collect();
            let base = controlling.hw_port_id();

            let lanes = self
                .initial_lanes
                .get(&base)
                .copied()
                .unwrap_or(DEFAULT_INITIAL_LANES);
            asic.set_active_lanes_raw(base, lanes);

            orch.add_group(PortGroup::new(asic.clone(), controlling, members)?)?;
        }

        debug!(
            "Built simulated switch with {} ports in {} groups",
            ports.len(),
            orch.group_count()
        );
        Ok(SimulatedSwitch { asic, orch })
    }
}
