//! Container vehicle: the composition root.
//!
//! Owns every subsystem and wires them to the task runner. The runner
//! drives three periodic tasks against the vehicle as shared context:
//!
//! ```text
//!              ┌──────────────────────────────────────┐
//!              │            TaskRunner<Vehicle>       │
//!              │  "radio-poll"  every cycle           │
//!              │  "control"     control_interval_ms   │
//!              │  "telemetry"   telemetry_interval_ms │
//!              └───────┬──────────────┬──────────┬────┘
//!                      ▼              ▼          ▼
//!               RadioLinkManager  Sequencer  Reporter
//!                      │          Altimeter      │
//!                      └──── ground downlink ────┘
//! ```
//!
//! All hardware access goes through the port traits, so the whole
//! vehicle runs unmodified against host-side mocks.

use log::warn;

use crate::altimeter::BaroAltimeter;
use crate::app::dispatch::CommandDispatch;
use crate::app::ports::{ActuatorAccess, ActuatorPort, ClockPort, PressureSource, RadioPort};
use crate::config::MissionConfig;
use crate::radio::RadioLinkManager;
use crate::runner::{Spawner, TaskRunner};
use crate::sequencer::DeploySequencer;
use crate::telemetry::{ContainerSnapshot, TelemetryReporter};

pub struct Vehicle<R, P, A, K>
where
    R: RadioPort,
    P: PressureSource,
    A: ActuatorPort,
    K: ClockPort,
{
    config: MissionConfig,
    radio: RadioLinkManager<R>,
    altimeter: BaroAltimeter<P>,
    actuators: A,
    clock: K,
    sequencer: DeploySequencer,
    telemetry: TelemetryReporter,
}

impl<R, P, A, K> ActuatorAccess for Vehicle<R, P, A, K>
where
    R: RadioPort,
    P: PressureSource,
    A: ActuatorPort,
    K: ClockPort,
{
    fn actuators(&mut self) -> &mut dyn ActuatorPort {
        &mut self.actuators
    }
}

impl<R, P, A, K> Vehicle<R, P, A, K>
where
    R: RadioPort + 'static,
    P: PressureSource + 'static,
    A: ActuatorPort + 'static,
    K: ClockPort + 'static,
{
    pub fn new(config: MissionConfig, radio: R, pressure: P, actuators: A, clock: K) -> Self {
        let radio = RadioLinkManager::new(radio, &config);
        let altimeter = BaroAltimeter::new(pressure, config.sea_level_pressure_pa);
        let sequencer = DeploySequencer::new(&config);
        let telemetry = TelemetryReporter::new(config.team_id);
        Self { config, radio, altimeter, actuators, clock, sequencer, telemetry }
    }

    /// Register the three mission tasks. The radio poll runs every
    /// cycle so link restoration and command latency are bounded by the
    /// caller's poll cadence, not by any interval.
    pub fn register_tasks(runner: &mut TaskRunner<Self>, config: &MissionConfig) {
        runner.periodic("radio-poll", 0, |_, v, _| v.poll_radio());
        runner.periodic("control", config.control_interval_ms, |_, v, sched| {
            v.control_cycle(sched);
        });
        runner.periodic("telemetry", config.telemetry_interval_ms, |now, v, _| {
            v.send_container_telemetry(now);
        });
    }

    /// Drain the radio, dispatching ground commands and staging payload
    /// frames, then relay anything staged onto the ground downlink.
    pub fn poll_radio(&mut self) {
        let Self { radio, altimeter, telemetry, clock, .. } = self;
        {
            let mut sink = CommandDispatch {
                altimeter,
                telemetry: &mut *telemetry,
                clock,
            };
            radio.poll(&mut sink);
        }
        for frame in telemetry.take_forwards() {
            radio.send_ground(&frame);
        }
    }

    /// One control cycle: sample altitude, run the sequencer, and on
    /// the payload-release edge notify the payload over its own link.
    pub fn control_cycle(&mut self, sched: &mut Spawner<Self>) {
        let altitude = self.altimeter.read_altitude();
        let was_released = self.sequencer.payload_released();

        let Self { sequencer, actuators, .. } = self;
        sequencer.evaluate(altitude, actuators, sched);

        if !was_released && self.sequencer.payload_released() {
            let timeout = self.config.link_switch_timeout_ms;
            if let Err(err) = self.radio.relay_to_payload(b"ON", timeout) {
                // The payload still releases mechanically; only the
                // activation notice is lost. Next poll restores the link.
                warn!("payload activation relay failed: {err}");
            }
        }
    }

    /// Emit one container telemetry record, unless downlink is off.
    pub fn send_container_telemetry(&mut self, now_ms: u64) {
        if !self.telemetry.is_enabled() {
            return;
        }
        let altitude = self.altimeter.read_altitude();
        let snap = ContainerSnapshot {
            hms: self.clock.hms(),
            centis: ((now_ms / 10) % 100) as u8,
            altitude_m: altitude,
            temperature_c: self.altimeter.temperature_c(),
            sim_active: self.altimeter.is_sim_active(),
            tp_released: self.sequencer.payload_released(),
            phase: self.sequencer.phase(),
        };
        let record = self.telemetry.build_record(&snap);
        self.radio.send_ground(record.as_bytes());
    }

    pub fn sequencer(&self) -> &DeploySequencer {
        &self.sequencer
    }

    pub fn telemetry(&self) -> &TelemetryReporter {
        &self.telemetry
    }

    pub fn current_link(&self) -> u16 {
        self.radio.current_link()
    }
}
