//! Common SONiC types for switch port orchestration.
//!
//! This crate provides type-safe representations of the port primitives
//! shared by the SONiC control plane crates:
//!
//! - [`PortId`]: logical port identifier in the switch state
//! - [`HwPortId`]: ASIC port number used to address hardware registers
//! - [`PortSpeed`]: configured port transmission rate
//! - [`AdminState`]: administrative up/down state

mod port;
mod speed;

pub use port::{AdminState, HwPortId, PortId};
pub use speed::PortSpeed;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid port speed: {0}")]
    InvalidPortSpeed(String),

    #[error("invalid admin state: {0}")]
    InvalidAdminState(String),
}
