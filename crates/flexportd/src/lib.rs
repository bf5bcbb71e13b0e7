//! Flex-port lane management for SONiC.
//!
//! This crate implements the `flexportd` daemon, which keeps the lane mode of
//! every four-lane port group in step with the configured port speeds and
//! admin states.
//!
//! # Responsibilities
//!
//! - Derive each group's lane mode (`SINGLE`, `DUAL`, `QUAD`) from its members
//! - Reject configurations a group cannot realise before touching hardware
//! - Run the disable / set-lanes / re-enable sequence when the mode changes
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`port_group`] | Lane-mode resolution and reconfiguration of one group |
//! | [`orch`] | Switch-wide group table |
//! | [`state`] | Desired per-port configuration snapshot |
//! | [`sai`] | Group collaborators over the SAI port API |
//! | [`sim`] | Simulated ASIC for testing and hardware-less runs |
//! | [`config`] | YAML platform and state description |
//!
//! # Example
//!
//! ```ignore
//! use sonic_flexportd::{FlexPortConfig, FlexPortOrchConfig};
//!
//! let config = FlexPortConfig::load("/etc/sonic/flexportd.yaml")?;
//! let mut switch = config.platform.build_simulated(FlexPortOrchConfig::default())?;
//! switch.orch.apply_state(&config.switch_state())?;
//! ```

pub mod config;
pub mod error;
pub mod orch;
pub mod port_group;
pub mod sai;
pub mod sim;
pub mod state;

pub use config::{ConfigError, FlexPortConfig, PlatformConfig, SimulatedSwitch};
pub use error::{FlexPortError, Result};
pub use orch::{ApplySummary, FlexPortOrch, FlexPortOrchConfig, FlexPortOrchStats};
pub use port_group::{
    calculate_desired_lane_mode, needed_lane_mode_for_speed, GroupMember, LaneControl, LaneMode,
    PortGroup, LANES_PER_GROUP,
};
pub use state::{PortState, SwitchState};
