//! Safe Rust bindings for SAI (Switch Abstraction Interface).
//!
//! This crate provides type-safe wrappers around the SAI C API, preventing
//! common errors like mixing object IDs of different types and ensuring
//! proper error handling.
//!
//! - [`types`]: type-safe object IDs
//! - [`error`]: error type shared by the wrappers
//! - [`api`]: safe wrappers around SAI API functions
//!
//! # Example
//!
//! ```ignore
//! use sonic_sai::{api::PortApi, PortOid, SaiResult};
//!
//! fn quad_lanes(api: &PortApi, port: PortOid) -> SaiResult<()> {
//!     api.set_admin_state(port, false)?;
//!     api.set_active_lane_count(port, 1)
//! }
//! ```

pub mod api;
pub mod error;
pub mod types;

pub use types::{PortKind, PortOid, SaiObjectId, SaiObjectKind, SwitchKind, SwitchOid};

pub use error::{SaiError, SaiResult};
