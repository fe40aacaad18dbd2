//! Port traits: the boundary between domain logic and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ domain (runner / radio / sequencer)
//! ```
//!
//! Driven adapters (radio transport, barometer, servos, buzzer, RTC)
//! implement these traits. The domain consumes them via generics, so it
//! never touches a peripheral register and runs unmodified on the host.

use super::commands::Command;

// ───────────────────────────────────────────────────────────────
// Radio transport port (frame-level, link-identifier switching)
// ───────────────────────────────────────────────────────────────

/// Upper bound on a single radio frame payload.
pub const MAX_FRAME_LEN: usize = 256;

/// One inbound frame, tagged with the sender's short address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub source: u16,
    pub payload: heapless::Vec<u8, MAX_FRAME_LEN>,
}

impl Frame {
    /// Build a frame from raw bytes, truncating anything past
    /// [`MAX_FRAME_LEN`].
    pub fn new(source: u16, bytes: &[u8]) -> Self {
        let take = bytes.len().min(MAX_FRAME_LEN);
        let mut payload = heapless::Vec::new();
        // Cannot fail: `take` is bounded by the capacity.
        let _ = payload.extend_from_slice(&bytes[..take]);
        Self { source, payload }
    }
}

/// Outcome of a link-identifier switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum LinkStatus {
    /// The radio acknowledged the new identifier within the timeout.
    Confirmed,
    /// No acknowledgment in time; link state unknown, retry later.
    TimedOut,
}

/// Frame-level access to the single physical radio.
pub trait RadioPort {
    /// Request a switch of the shared link identifier. Blocks the caller
    /// for up to `timeout_ms` awaiting the hardware acknowledgment; this
    /// is the only operation in the firmware allowed to block.
    fn set_link(&mut self, id: u16, timeout_ms: u32) -> LinkStatus;

    /// Take the next pending inbound frame, if any. Non-blocking.
    fn recv(&mut self) -> Option<Frame>;

    /// Transmit a frame to `dest`. Fire-and-forget.
    fn send(&mut self, dest: u16, payload: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → irreversible hardware actions)
// ───────────────────────────────────────────────────────────────

/// Commanded rate for the tethered-payload descent spool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescentRate {
    /// Spool locked (pre-release).
    Hold,
    /// Fast pay-out immediately after release.
    Deploying,
    /// Steady rate for the remainder of the descent.
    Cruise,
}

/// Write-side port for the three actuators plus the recovery beacon.
/// Every call is fire-and-forget: no mechanical confirmation is read
/// back, so callers must treat actuation as best-effort.
pub trait ActuatorPort {
    /// Drive the parachute release servo to its deployed position.
    fn deploy_parachute(&mut self);

    /// Open the tethered-payload retention latch.
    fn release_payload(&mut self);

    /// Set the payload descent spool rate.
    fn set_descent_rate(&mut self, rate: DescentRate);

    /// Sound the audible recovery beacon.
    fn sound_beacon(&mut self);
}

/// Deferred-task access to the actuator port. One-shot continuations
/// run against the runner's context type, which exposes its actuators
/// through this trait.
pub trait ActuatorAccess {
    fn actuators(&mut self) -> &mut dyn ActuatorPort;
}

// ───────────────────────────────────────────────────────────────
// Barometer port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One barometer reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaroSample {
    pub pressure_pa: f32,
    pub temperature_c: f32,
}

/// Read-side port for the pressure sensor. `None` means the read failed
/// this cycle; the altimeter falls back to its last good sample.
pub trait PressureSource {
    fn read(&mut self) -> Option<BaroSample>;
}

// ───────────────────────────────────────────────────────────────
// Wall-clock port (RTC)
// ───────────────────────────────────────────────────────────────

/// UTC wall-clock access for telemetry timestamps. Settable by the
/// `ST` uplink command.
pub trait ClockPort {
    /// Current (hour, minute, second).
    fn hms(&self) -> (u8, u8, u8);

    /// Set the wall clock.
    fn set_hms(&mut self, hour: u8, minute: u8, second: u8);
}

// ───────────────────────────────────────────────────────────────
// Inbound-frame sinks (radio manager → application)
// ───────────────────────────────────────────────────────────────

/// Receives parsed ground-station commands, synchronously, inside the
/// radio manager's poll.
pub trait CommandSink {
    /// `raw` is the trimmed command line as received, for echoing.
    fn on_command(&mut self, cmd: Command, raw: &str);
}

/// Receives payload frames for verbatim relay onto the ground downlink.
/// The container does not interpret payload telemetry.
pub trait DownlinkSink {
    fn forward_payload(&mut self, raw: &[u8]);
}
