//! Mission configuration parameters
//!
//! All tunable parameters for the container flight software: actuation
//! altitudes, link identifiers, radio addresses, and loop timing.
//! Values are fixed per mission; a future uplink-provisioning path can
//! deserialize a replacement over the ground link.

use serde::{Deserialize, Serialize};

/// Core mission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionConfig {
    // --- Identity ---
    /// Competition-assigned team identifier (leads every telemetry record).
    pub team_id: u16,

    // --- Radio link ---
    /// Link identifier for the ground-station session.
    pub ground_link_id: u16,
    /// Link identifier for the payload session.
    pub payload_link_id: u16,
    /// Short address of this vehicle's radio.
    pub container_addr: u16,
    /// Short address of the payload's radio.
    pub payload_addr: u16,
    /// Short address of the ground station's radio.
    pub ground_addr: u16,
    /// Timeout for a link-identifier switch (milliseconds).
    pub link_switch_timeout_ms: u32,

    // --- Actuation altitudes (metres above launch site) ---
    /// Parachute deployment altitude.
    pub parachute_deploy_m: f32,
    /// Tethered-payload release altitude.
    pub payload_release_m: f32,
    /// Recovery beacon activation altitude.
    pub beacon_activate_m: f32,
    /// Delay between payload release and the descent spool settling to
    /// its steady cruise rate (milliseconds).
    pub descent_settle_delay_ms: u64,

    // --- Timing ---
    /// Actuation-check (control) interval (milliseconds).
    pub control_interval_ms: u64,
    /// Container telemetry interval (milliseconds).
    pub telemetry_interval_ms: u64,

    // --- Barometry ---
    /// Sea-level reference pressure (pascals).
    pub sea_level_pressure_pa: f32,
}

impl Default for MissionConfig {
    fn default() -> Self {
        const TEAM_ID: u16 = 1057;
        Self {
            team_id: TEAM_ID,

            // Radio link
            ground_link_id: TEAM_ID,
            payload_link_id: TEAM_ID + 5000,
            container_addr: 0,
            payload_addr: 1,
            ground_addr: 2,
            link_switch_timeout_ms: 100,

            // Actuation altitudes
            parachute_deploy_m: 400.0,
            payload_release_m: 300.0,
            beacon_activate_m: 15.0,
            descent_settle_delay_ms: 20_000,

            // Timing
            control_interval_ms: 1000,   // 1 Hz
            telemetry_interval_ms: 1000, // 1 Hz

            // Barometry
            sea_level_pressure_pa: 101_325.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = MissionConfig::default();
        assert!(c.parachute_deploy_m > c.payload_release_m);
        assert!(c.payload_release_m > c.beacon_activate_m);
        assert!(c.control_interval_ms > 0);
        assert!(c.telemetry_interval_ms > 0);
        assert!(c.link_switch_timeout_ms > 0);
        assert!(c.descent_settle_delay_ms > c.control_interval_ms);
    }

    #[test]
    fn link_identifiers_are_distinct() {
        let c = MissionConfig::default();
        assert_ne!(
            c.ground_link_id, c.payload_link_id,
            "the two logical links must never share an identifier"
        );
    }

    #[test]
    fn radio_addresses_are_distinct() {
        let c = MissionConfig::default();
        assert_ne!(c.container_addr, c.payload_addr);
        assert_ne!(c.container_addr, c.ground_addr);
        assert_ne!(c.payload_addr, c.ground_addr);
    }

    #[test]
    fn serde_roundtrip() {
        let c = MissionConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: MissionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.team_id, c2.team_id);
        assert_eq!(c.ground_link_id, c2.ground_link_id);
        assert!((c.parachute_deploy_m - c2.parachute_deploy_m).abs() < 0.001);
        assert_eq!(c.descent_settle_delay_ms, c2.descent_settle_delay_ms);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = MissionConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: MissionConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.payload_link_id, c2.payload_link_id);
        assert!((c.sea_level_pressure_pa - c2.sea_level_pressure_pa).abs() < 0.001);
    }
}
