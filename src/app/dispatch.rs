//! Command dispatch: turns parsed uplink commands into side effects on
//! the subsystems that implement them.
//!
//! The dispatcher borrows the subsystems for the duration of a single
//! radio poll, so the link manager can route frames into it without
//! taking ownership of anything.

use log::{debug, info, warn};

use crate::altimeter::BaroAltimeter;
use crate::app::commands::Command;
use crate::app::ports::{ClockPort, CommandSink, DownlinkSink, PressureSource};
use crate::telemetry::TelemetryReporter;

pub struct CommandDispatch<'a, P: PressureSource, K: ClockPort> {
    pub altimeter: &'a mut BaroAltimeter<P>,
    pub telemetry: &'a mut TelemetryReporter,
    pub clock: &'a mut K,
}

impl<P: PressureSource, K: ClockPort> CommandSink for CommandDispatch<'_, P, K> {
    fn on_command(&mut self, cmd: Command, raw: &str) {
        match cmd {
            Command::SetTelemetry(on) => {
                info!("telemetry {}", if on { "enabled" } else { "disabled" });
                self.telemetry.set_enabled(on);
                self.telemetry.note_command(raw);
            }
            Command::SetTime { hour, minute, second } => {
                info!("mission clock set to {:02}:{:02}:{:02}", hour, minute, second);
                self.clock.set_hms(hour, minute, second);
                self.telemetry.note_command(raw);
            }
            Command::SetSimMode(mode) => {
                self.altimeter.apply_sim(mode);
                self.telemetry.note_command(raw);
            }
            Command::SetSimPressure(pa) => {
                self.altimeter.set_sim_pressure(pa);
                self.telemetry.note_command(raw);
            }
            Command::Named(name) => {
                // Well-formed for our team but a verb we do not handle.
                // Echoed anyway so the ground can see what arrived.
                warn!("unhandled command verb: {}", name);
                self.telemetry.note_command(raw);
            }
            Command::PayloadDepth(m) => {
                debug!("tethered payload depth: {m:.1} m");
                self.telemetry.set_payload_depth(m);
            }
            Command::Invalid => {
                warn!("discarding invalid uplink: {:?}", raw);
            }
        }
    }
}

impl<P: PressureSource, K: ClockPort> DownlinkSink for CommandDispatch<'_, P, K> {
    fn forward_payload(&mut self, raw: &[u8]) {
        self.telemetry.queue_forward(raw);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
