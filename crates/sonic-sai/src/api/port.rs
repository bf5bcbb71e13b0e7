//! Safe wrapper for the SAI port API.
//!
//! Covers the attributes the flex-port path touches: admin state, speed, and
//! the active lane count of a port group's controlling port.

use sonic_types::PortSpeed;

use crate::error::{SaiError, SaiResult};
use crate::types::{PortOid, SwitchOid};

/// Lane counts a port can be programmed with.
pub const VALID_LANE_COUNTS: [u32; 3] = [1, 2, 4];

/// Safe wrapper for SAI port API.
///
/// This struct will hold the raw SAI port API pointer when FFI is enabled.
/// Until then every call validates its arguments and reports
/// [`SaiError::NotSupported`].
#[derive(Debug)]
pub struct PortApi {
    switch_id: SwitchOid,
    // When FFI is enabled:
    // api: *const sai_port_api_t,
}

impl PortApi {
    /// Creates a new PortApi instance.
    pub fn new(switch_id: SwitchOid) -> Self {
        Self { switch_id }
    }

    /// Returns the switch ID this API is associated with.
    pub fn switch_id(&self) -> SwitchOid {
        self.switch_id
    }

    fn check_port(port: PortOid) -> SaiResult<()> {
        if port.is_null() {
            return Err(SaiError::invalid_parameter("port OID is null"));
        }
        Ok(())
    }

    /// Sets the administrative state of a port.
    pub fn set_admin_state(&self, port: PortOid, up: bool) -> SaiResult<()> {
        Self::check_port(port)?;

        // TODO: call sai_port_api->set_port_attribute(SAI_PORT_ATTR_ADMIN_STATE) once FFI is linked
        let _ = up;
        Err(SaiError::not_supported("FFI not enabled"))
    }

    /// Sets the port speed.
    ///
    /// # Errors
    ///
    /// Returns an error for the unspecified speed sentinel.
    pub fn set_speed(&self, port: PortOid, speed: PortSpeed) -> SaiResult<()> {
        Self::check_port(port)?;

        if speed.is_default() {
            return Err(SaiError::invalid_parameter("speed must be specified"));
        }

        Err(SaiError::not_supported("FFI not enabled"))
    }

    /// Gets the list of speeds the port hardware supports.
    pub fn get_supported_speeds(&self, port: PortOid) -> SaiResult<Vec<PortSpeed>> {
        Self::check_port(port)?;
        Err(SaiError::not_supported("FFI not enabled"))
    }

    /// Gets the number of serdes lanes currently active on a port.
    pub fn get_active_lane_count(&self, port: PortOid) -> SaiResult<u32> {
        Self::check_port(port)?;
        Err(SaiError::not_supported("FFI not enabled"))
    }

    /// Programs the number of serdes lanes a port uses.
    ///
    /// # Errors
    ///
    /// Returns an error if `lanes` is not 1, 2 or 4.
    pub fn set_active_lane_count(&self, port: PortOid, lanes: u32) -> SaiResult<()> {
        Self::check_port(port)?;

        if !VALID_LANE_COUNTS.contains(&lanes) {
            return Err(SaiError::invalid_parameter(format!(
                "invalid lane count: {} (must be 1, 2 or 4)",
                lanes
            )));
        }

        Err(SaiError::not_supported("FFI not enabled"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_port_api_null_validation() {
        let api = PortApi::new(SwitchOid::NULL);
        let null_port = PortOid::NULL;

        assert!(matches!(
            api.set_admin_state(null_port, true),
            Err(SaiError::InvalidParameter { .. })
        ));
        assert!(api.get_active_lane_count(null_port).is_err());
        assert!(api.set_active_lane_count(null_port, 4).is_err());
    }

    #[test]
    fn test_lane_count_validation() {
        let api = PortApi::new(SwitchOid::NULL);
        let port = PortOid::from_raw(0x1000000000001).unwrap();

        assert!(matches!(
            api.set_active_lane_count(port, 3),
            Err(SaiError::InvalidParameter { .. })
        ));
        assert!(matches!(
            api.set_active_lane_count(port, 2),
            Err(SaiError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_speed_validation() {
        let api = PortApi::new(SwitchOid::NULL);
        let port = PortOid::from_raw(0x1000000000001).unwrap();

        assert_eq!(
            api.set_speed(port, PortSpeed::Default),
            Err(SaiError::invalid_parameter("speed must be specified"))
        );
    }
}
