//! Safe wrappers for SAI API functions.
//!
//! Each submodule provides type-safe Rust wrappers around the corresponding
//! SAI C API, converting status codes to Rust Results.
//!
//! # Available API Modules
//!
//! - [`port`]: Port admin state, speed and lane-count control

pub mod port;

pub use port::{PortApi, VALID_LANE_COUNTS};
