//! Typed uplink commands.
//!
//! The closed set of commands the ground station can send. Exactly one
//! variant is produced per received line; anything unintelligible maps
//! to [`Command::Invalid`] rather than being silently swallowed, so the
//! dispatch layer can log it.

/// Simulation-mode sub-command. Simulation arming is deliberately a
/// two-step sequence (`Enable` then `Activate`) so a single stray frame
/// cannot switch the vehicle onto simulated pressure mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    Enable,
    Activate,
    Disable,
}

/// Commands the ground station can uplink to the container.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `CX ON` / `CX OFF`: container telemetry transmission toggle.
    SetTelemetry(bool),

    /// `ST hh:mm:ss`: set the wall clock to UTC time.
    SetTime { hour: u8, minute: u8, second: u8 },

    /// `SIM ENABLE|ACTIVATE|DISABLE`: simulation-mode control.
    SetSimMode(SimCommand),

    /// `SIMP <pascals>`: simulated barometric pressure override.
    SetSimPressure(f32),

    /// A recognised record shape with a verb this firmware has no
    /// handler logic for; acknowledged and echoed only.
    Named(heapless::String<16>),

    /// `TPD <metres>`: tethered-payload depth report.
    PayloadDepth(f32),

    /// Unparseable or not addressed to this vehicle.
    Invalid,
}
