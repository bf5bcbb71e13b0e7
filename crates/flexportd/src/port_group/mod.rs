//! Port groups - flex-port lane management.
//!
//! A port group is four consecutive ASIC ports sharing four serdes lanes.
//! Depending on configured speeds the lanes are split as:
//!
//! | Mode | Active lanes per port | Ports that may be enabled |
//! |------|-----------------------|---------------------------|
//! | `SINGLE` | 4 | lane 0 |
//! | `DUAL` | 2 | lanes 0, 2 |
//! | `QUAD` | 1 | lanes 0-3 |
//!
//! # Architecture
//!
//! ```text
//! SwitchState
//!      │
//!      ▼
//!  PortGroup ──> GroupMember (disable / enable, counter-DMA, linkscan)
//!      │
//!      └──────> LaneControl (active lane count on the controlling port)
//! ```

mod group;
mod member;
mod types;

pub use group::{calculate_desired_lane_mode, needed_lane_mode_for_speed, PortGroup};
pub use member::{GroupMember, LaneControl};
pub use types::{LaneMode, LANES_PER_GROUP};
