//! Container telemetry downlink.
//!
//! Builds the comma-separated container record transmitted to the
//! ground station once per telemetry interval:
//!
//! ```text
//! <TEAM_ID>,<hh:mm:ss.cc>,<COUNT>,C,<MODE>,<TP_RELEASED>,<ALT>,<TEMP>,
//! <VOLTAGE>,<GPS_TIME>,<LAT>,<LON>,<GPS_ALT>,<SATS>,<STATE>,<CMD_ECHO>
//! ```
//!
//! e.g. `1057,13:23:45.91,175,C,S,R,476.2,28.3,5.02,13:23:15,69.4201,-3.2635,698.2,7,TP_DESCENT,SIMP101325`
//!
//! The reporter also stages payload frames for verbatim relay to the
//! ground: the container forwards payload telemetry without
//! interpreting a byte of it.

use log::info;

use crate::app::ports::MAX_FRAME_LEN;

/// Longest echoed command, commas stripped.
const ECHO_LEN: usize = 32;

/// GPS solution snapshot for the telemetry record.
///
/// Values default to the fixed bring-up placeholders until the GPS feed
/// is wired in.
/// TODO: replace with the live NMEA solution once the GPS serial driver
/// lands.
#[derive(Debug, Clone)]
pub struct GpsFix {
    pub time_utc: heapless::String<8>,
    pub latitude_deg: f32,
    pub longitude_deg: f32,
    pub altitude_m: f32,
    pub sats: u8,
}

impl Default for GpsFix {
    fn default() -> Self {
        let mut time_utc = heapless::String::new();
        let _ = time_utc.push_str("13:23:15");
        Self {
            time_utc,
            latitude_deg: 69.4201,
            longitude_deg: -3.2635,
            altitude_m: 698.2,
            sats: 7,
        }
    }
}

/// Everything the record needs from the rest of the vehicle, captured
/// at build time.
#[derive(Debug, Clone, Copy)]
pub struct ContainerSnapshot {
    pub hms: (u8, u8, u8),
    /// Sub-second fraction of the mission clock (hundredths).
    pub centis: u8,
    pub altitude_m: f32,
    pub temperature_c: f32,
    pub sim_active: bool,
    pub tp_released: bool,
    pub phase: &'static str,
}

/// Owns the downlink-side state: enable flag, packet counter, command
/// echo, and the payload-relay queue.
pub struct TelemetryReporter {
    team_id: u16,
    enabled: bool,
    packet_count: u32,
    cmd_echo: heapless::String<ECHO_LEN>,
    /// Last depth reported by the tethered payload, if any.
    payload_depth_m: Option<f32>,
    pub gps: GpsFix,
    /// Bus voltage placeholder until the divider ADC is calibrated.
    bus_voltage_v: f32,
    /// Payload frames awaiting relay onto the ground downlink.
    forwards: Vec<heapless::Vec<u8, MAX_FRAME_LEN>>,
}

impl TelemetryReporter {
    pub fn new(team_id: u16) -> Self {
        Self {
            team_id,
            enabled: true,
            packet_count: 0,
            cmd_echo: heapless::String::new(),
            payload_depth_m: None,
            gps: GpsFix::default(),
            bus_voltage_v: 5.02,
            forwards: Vec::new(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        info!(
            "container telemetry {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn packet_count(&self) -> u32 {
        self.packet_count
    }

    /// Remember a received command for the record's echo field: the
    /// `CMD,<team>,` prefix is dropped and remaining commas removed, so
    /// `CMD,1057,SIMP,101325` echoes as `SIMP101325`.
    pub fn note_command(&mut self, raw: &str) {
        let rest = raw.strip_prefix("CMD,").map_or(raw, |r| {
            r.split_once(',').map_or(r, |(_, after_team)| after_team)
        });
        self.cmd_echo.clear();
        for ch in rest.chars().filter(|c| *c != ',') {
            if self.cmd_echo.push(ch).is_err() {
                break; // echo field is fixed-width; truncate
            }
        }
    }

    pub fn cmd_echo(&self) -> &str {
        &self.cmd_echo
    }

    /// Remember the latest tethered-payload depth report. The container
    /// record format has no depth field, so the value is held here for
    /// ground-side status queries rather than downlinked.
    pub fn set_payload_depth(&mut self, depth_m: f32) {
        self.payload_depth_m = Some(depth_m);
    }

    pub fn payload_depth_m(&self) -> Option<f32> {
        self.payload_depth_m
    }

    /// Stage a payload frame for relay to the ground station.
    pub fn queue_forward(&mut self, raw: &[u8]) {
        let take = raw.len().min(MAX_FRAME_LEN);
        let mut buf = heapless::Vec::new();
        let _ = buf.extend_from_slice(&raw[..take]);
        self.forwards.push(buf);
    }

    /// Drain the staged payload frames (called by the radio poll task).
    pub fn take_forwards(&mut self) -> Vec<heapless::Vec<u8, MAX_FRAME_LEN>> {
        std::mem::take(&mut self.forwards)
    }

    /// Build one container record and advance the packet counter.
    pub fn build_record(&mut self, snap: &ContainerSnapshot) -> String {
        self.packet_count += 1;
        let (hour, minute, second) = snap.hms;
        let mode = if snap.sim_active { 'S' } else { 'F' };
        let tp = if snap.tp_released { 'R' } else { 'N' };
        format!(
            "{},{:02}:{:02}:{:02}.{:02},{},C,{},{},{:.1},{:.1},{:.2},{},{:.4},{:.4},{:.1},{},{},{}",
            self.team_id,
            hour,
            minute,
            second,
            snap.centis,
            self.packet_count,
            mode,
            tp,
            snap.altitude_m,
            snap.temperature_c,
            self.bus_voltage_v,
            self.gps.time_utc,
            self.gps.latitude_deg,
            self.gps.longitude_deg,
            self.gps.altitude_m,
            self.gps.sats,
            snap.phase,
            self.cmd_echo,
        )
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
