//! Switch state snapshot consumed by port groups.
//!
//! Only the per-port fields that decide lane usage are modelled: the
//! configured speed and the administrative state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sonic_types::{AdminState, PortId, PortSpeed};

use crate::error::{FlexPortError, Result};

/// Desired configuration of one logical port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortState {
    /// Logical port id.
    pub id: PortId,
    /// Configured speed; [`PortSpeed::Default`] when unset.
    #[serde(default)]
    pub speed: PortSpeed,
    /// Administrative state.
    #[serde(default, rename = "admin_status")]
    pub admin_state: AdminState,
}

impl PortState {
    /// Creates an enabled port at the given speed.
    pub fn enabled(id: PortId, speed: PortSpeed) -> Self {
        Self {
            id,
            speed,
            admin_state: AdminState::Up,
        }
    }

    /// Creates a disabled port at the given speed.
    pub fn disabled(id: PortId, speed: PortSpeed) -> Self {
        Self {
            id,
            speed,
            admin_state: AdminState::Down,
        }
    }

    /// Returns true if the port is administratively disabled.
    pub fn is_disabled(&self) -> bool {
        self.admin_state.is_down()
    }
}

/// Immutable snapshot of the desired per-port configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchState {
    ports: BTreeMap<PortId, PortState>,
}

impl SwitchState {
    /// Creates an empty switch state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a port entry, returning the updated state.
    pub fn with_port(mut self, port: PortState) -> Self {
        self.ports.insert(port.id, port);
        self
    }

    /// Adds or replaces a port entry.
    pub fn upsert_port(&mut self, port: PortState) -> Option<PortState> {
        self.ports.insert(port.id, port)
    }

    /// Looks up a port.
    pub fn port(&self, id: PortId) -> Result<&PortState> {
        self.ports
            .get(&id)
            .ok_or(FlexPortError::PortNotInState { port: id })
    }

    /// Returns the number of ports in the snapshot.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Iterates over ports in id order.
    pub fn ports(&self) -> impl Iterator<Item = &PortState> {
        self.ports.values()
    }
}

impl FromIterator<PortState> for SwitchState {
    fn from_iter<I: IntoIterator<Item = PortState>>(iter: I) -> Self {
        Self {
            ports: iter.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}
