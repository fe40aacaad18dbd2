//! Host-side mission simulation.
//!
//! Runs the full container stack against mock hardware: a scripted
//! barometric descent from 700 m, a loopback radio fed a handful of
//! ground commands, and logging actuators. Useful for eyeballing the
//! actuation sequence and telemetry cadence without a vehicle on the
//! bench.
//!
//! ```text
//! RUST_LOG=info cargo run --bin cansat-sim
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use log::info;

use cansat_container::app::ports::{
    ActuatorPort, BaroSample, ClockPort, DescentRate, Frame, LinkStatus, PressureSource, RadioPort,
};
use cansat_container::config::MissionConfig;
use cansat_container::runner::TaskRunner;
use cansat_container::vehicle::Vehicle;

const DESCENT_START_M: f32 = 700.0;
const DESCENT_RATE_MPS: f32 = 2.5;
const STEP_MS: u64 = 50;
const MISSION_MS: u64 = 600_000;

/// Loopback radio. The inbox is shared with the script driver; sent
/// frames are logged.
struct SimRadio {
    inbox: Rc<RefCell<VecDeque<Frame>>>,
}

impl RadioPort for SimRadio {
    fn set_link(&mut self, id: u16, _timeout_ms: u32) -> LinkStatus {
        info!("radio: link -> {id}");
        LinkStatus::Confirmed
    }

    fn recv(&mut self) -> Option<Frame> {
        self.inbox.borrow_mut().pop_front()
    }

    fn send(&mut self, dest: u16, payload: &[u8]) {
        info!("tx[{dest}]: {}", String::from_utf8_lossy(payload));
    }
}

struct SimActuators;

impl ActuatorPort for SimActuators {
    fn deploy_parachute(&mut self) {
        info!("actuator: PARACHUTE DEPLOY");
    }

    fn release_payload(&mut self) {
        info!("actuator: PAYLOAD RELEASE");
    }

    fn set_descent_rate(&mut self, rate: DescentRate) {
        info!("actuator: descent rate -> {rate:?}");
    }

    fn sound_beacon(&mut self) {}
}

struct SimClock {
    hms: (u8, u8, u8),
}

impl ClockPort for SimClock {
    fn hms(&self) -> (u8, u8, u8) {
        self.hms
    }

    fn set_hms(&mut self, hour: u8, minute: u8, second: u8) {
        self.hms = (hour, minute, second);
    }
}

/// Pressure source following a shared altitude cell, inverting the
/// barometric formula the altimeter applies.
struct ProfileBaro {
    altitude_m: Rc<Cell<f32>>,
    sea_level_pa: f32,
}

impl PressureSource for ProfileBaro {
    fn read(&mut self) -> Option<BaroSample> {
        let h = self.altitude_m.get();
        let pressure_pa = self.sea_level_pa * (1.0 - h / 44_330.0).powf(1.0 / 0.190_295);
        Some(BaroSample { pressure_pa, temperature_c: 24.0 })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = MissionConfig::default();
    let inbox = Rc::new(RefCell::new(VecDeque::new()));
    let altitude = Rc::new(Cell::new(DESCENT_START_M));

    let radio = SimRadio { inbox: Rc::clone(&inbox) };
    let baro = ProfileBaro {
        altitude_m: Rc::clone(&altitude),
        sea_level_pa: config.sea_level_pressure_pa,
    };
    let clock = SimClock { hms: (13, 0, 0) };
    let ground_addr = config.ground_addr;

    let mut vehicle = Vehicle::new(config.clone(), radio, baro, SimActuators, clock);
    let mut runner = TaskRunner::new();
    Vehicle::register_tasks(&mut runner, &config);

    // Ground-station script: (time, uplink line).
    let mut script: VecDeque<(u64, &str)> = VecDeque::from([
        (1_000, "CMD,1057,ST,13:00:01"),
        (2_000, "CMD,1057,CX,ON"),
        (30_000, "CMD,1057,SIM,ENABLE"),
        (595_000, "CMD,1057,CX,OFF"),
    ]);

    info!(
        "descending from {DESCENT_START_M} m at {DESCENT_RATE_MPS} m/s ({:.0} Pa at start)",
        config.sea_level_pressure_pa * (1.0 - DESCENT_START_M / 44_330.0).powf(1.0 / 0.190_295)
    );

    let mut now_ms = 0;
    while now_ms <= MISSION_MS {
        let h = (DESCENT_START_M - DESCENT_RATE_MPS * (now_ms as f32 / 1000.0)).max(0.0);
        altitude.set(h);

        while let Some((at, line)) = script.front().copied() {
            if at > now_ms {
                break;
            }
            script.pop_front();
            inbox.borrow_mut().push_back(Frame::new(ground_addr, line.as_bytes()));
        }

        runner.run_once(now_ms, &mut vehicle);
        now_ms += STEP_MS;
    }

    runner.clear();
    info!(
        "mission complete: phase {}, {} packet(s) sent, final altitude {:.1} m",
        vehicle.sequencer().phase(),
        vehicle.telemetry().packet_count(),
        altitude.get(),
    );
    Ok(())
}
