//! Altitude-triggered actuation sequencer.
//!
//! Converts altitude samples into the mission's irreversible actuations.
//! Each actuation latches on its first firing and can never repeat:
//!
//! ```text
//!   altitude ≤ parachute_deploy_m   → deploy parachute       (latched)
//!   altitude ≤ payload_release_m    → release payload,
//!                                     spool to Deploying,
//!                                     +settle delay → Cruise (latched)
//!   altitude ≤ beacon_activate_m    → sound beacon        (NOT latched)
//! ```
//!
//! Thresholds are re-checked every evaluation cycle, fired or not;
//! re-testing a set latch costs nothing and needs no extra bookkeeping.
//! Triggers are raw single-sample comparisons with no debounce; the
//! latches make a noisy early trigger irreversible but never repeated.

use log::info;

use crate::app::ports::{ActuatorAccess, ActuatorPort, DescentRate};
use crate::config::MissionConfig;
use crate::runner::Spawner;

/// The latched, one-shot actuation state machine.
pub struct DeploySequencer {
    parachute_deploy_m: f32,
    payload_release_m: f32,
    beacon_activate_m: f32,
    settle_delay_ms: u64,

    parachute_released: bool,
    payload_released: bool,
    /// Never set: the beacon is deliberately re-commanded on every pass
    /// below its threshold instead of latching. Harmless for a buzzer.
    /// TODO: confirm with recovery crew whether the beacon should latch
    /// like the other two actions, or keep re-arming.
    beacon_armed: bool,
}

impl DeploySequencer {
    pub fn new(config: &MissionConfig) -> Self {
        Self {
            parachute_deploy_m: config.parachute_deploy_m,
            payload_release_m: config.payload_release_m,
            beacon_activate_m: config.beacon_activate_m,
            settle_delay_ms: config.descent_settle_delay_ms,
            parachute_released: false,
            payload_released: false,
            beacon_armed: false,
        }
    }

    /// Evaluate one altitude sample and issue any due actuations.
    ///
    /// The payload follow-on motion (spool to `Cruise` after the settle
    /// delay) is handed to the runner as a one-shot continuation; once
    /// scheduled it belongs entirely to the runner and cannot be
    /// cancelled. The release is unconditional and already done by
    /// then, so cancellation is never needed.
    pub fn evaluate<C: ActuatorAccess>(
        &mut self,
        altitude_m: f32,
        hw: &mut impl ActuatorPort,
        sched: &mut Spawner<C>,
    ) {
        if altitude_m <= self.parachute_deploy_m && !self.parachute_released {
            info!("parachute deploy at {altitude_m:.1} m");
            hw.deploy_parachute();
            self.parachute_released = true;
        }

        if altitude_m <= self.payload_release_m && !self.payload_released {
            info!("tethered payload release at {altitude_m:.1} m");
            hw.release_payload();
            hw.set_descent_rate(DescentRate::Deploying);
            self.payload_released = true;
            sched.after("tp-spool-cruise", self.settle_delay_ms, |_, ctx, _| {
                info!("payload spool settling to cruise rate");
                ctx.actuators().set_descent_rate(DescentRate::Cruise);
            });
        }

        if altitude_m <= self.beacon_activate_m {
            hw.sound_beacon();
        }
    }

    pub fn parachute_released(&self) -> bool {
        self.parachute_released
    }

    pub fn payload_released(&self) -> bool {
        self.payload_released
    }

    pub fn beacon_armed(&self) -> bool {
        self.beacon_armed
    }

    /// Mission phase string for the telemetry `STATE` field.
    pub fn phase(&self) -> &'static str {
        match (self.parachute_released, self.payload_released) {
            (false, false) => "DESCENT",
            (true, false) => "PARACHUTE_DESCENT",
            (_, true) => "TP_DESCENT",
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TaskRunner;

    /// Context holding recording actuators, driven by a real runner so
    /// the continuation path is exercised end to end.
    struct Rig {
        seq: DeploySequencer,
        hw: RecordingActuators,
    }

    #[derive(Default)]
    struct RecordingActuators {
        parachute: u32,
        release: u32,
        rates: Vec<DescentRate>,
        beacon: u32,
    }

    impl ActuatorPort for RecordingActuators {
        fn deploy_parachute(&mut self) {
            self.parachute += 1;
        }
        fn release_payload(&mut self) {
            self.release += 1;
        }
        fn set_descent_rate(&mut self, rate: DescentRate) {
            self.rates.push(rate);
        }
        fn sound_beacon(&mut self) {
            self.beacon += 1;
        }
    }

    impl ActuatorAccess for Rig {
        fn actuators(&mut self) -> &mut dyn ActuatorPort {
            &mut self.hw
        }
    }

    fn rig() -> (TaskRunner<Rig>, Rig) {
        let r = Rig {
            seq: DeploySequencer::new(&MissionConfig::default()),
            hw: RecordingActuators::default(),
        };
        (TaskRunner::new(), r)
    }

    /// One evaluation pass at the given altitude, via the runner so any
    /// continuation lands in the deferred queue.
    fn pass(runner: &mut TaskRunner<Rig>, ctx: &mut Rig, now: u64, altitude: f32) {
        runner.schedule_after("eval", now, 0, move |_, c: &mut Rig, sched| {
            let Rig { seq, hw } = c;
            seq.evaluate(altitude, hw, sched);
        });
        runner.run_once(now, ctx);
    }

    #[test]
    fn parachute_latches_exactly_once() {
        let (mut runner, mut ctx) = rig();
        for (t, alt) in [(0, 450.0), (1000, 410.0), (2000, 399.0), (3000, 390.0)] {
            pass(&mut runner, &mut ctx, t, alt);
        }
        assert_eq!(ctx.hw.parachute, 1);
        assert!(ctx.seq.parachute_released());

        // A noisy reading back above the threshold must not re-fire.
        pass(&mut runner, &mut ctx, 4000, 405.0);
        pass(&mut runner, &mut ctx, 5000, 395.0);
        assert_eq!(ctx.hw.parachute, 1);
    }

    #[test]
    fn payload_release_spools_deploying_then_cruise_once() {
        let (mut runner, mut ctx) = rig();
        pass(&mut runner, &mut ctx, 0, 299.0);
        assert_eq!(ctx.hw.release, 1);
        assert_eq!(ctx.hw.rates, vec![DescentRate::Deploying]);
        assert_eq!(runner.pending_deferred(), 1, "cruise continuation pending");

        // Altitude keeps falling; no repeat release, no early cruise.
        pass(&mut runner, &mut ctx, 10_000, 250.0);
        assert_eq!(ctx.hw.release, 1);
        assert_eq!(ctx.hw.rates, vec![DescentRate::Deploying]);

        // Settle delay elapses (20 s default): cruise exactly once.
        runner.run_once(20_000, &mut ctx);
        assert_eq!(
            ctx.hw.rates,
            vec![DescentRate::Deploying, DescentRate::Cruise]
        );
        assert_eq!(runner.pending_deferred(), 0);
        runner.run_once(60_000, &mut ctx);
        assert_eq!(ctx.hw.rates.len(), 2);
    }

    #[test]
    fn one_low_sample_fires_parachute_and_payload_together() {
        let (mut runner, mut ctx) = rig();
        // First sample already below both thresholds; both latch in one
        // evaluation, parachute first.
        pass(&mut runner, &mut ctx, 0, 120.0);
        assert_eq!(ctx.hw.parachute, 1);
        assert_eq!(ctx.hw.release, 1);
    }

    #[test]
    fn beacon_retriggers_every_pass_below_threshold() {
        let (mut runner, mut ctx) = rig();
        for (t, alt) in [(0, 12.0), (1000, 8.0), (2000, 3.0)] {
            pass(&mut runner, &mut ctx, t, alt);
        }
        // Not latched: commanded on every pass.
        assert_eq!(ctx.hw.beacon, 3);
        assert!(!ctx.seq.beacon_armed());
    }

    #[test]
    fn phase_tracks_the_latches() {
        let (mut runner, mut ctx) = rig();
        assert_eq!(ctx.seq.phase(), "DESCENT");
        pass(&mut runner, &mut ctx, 0, 380.0);
        assert_eq!(ctx.seq.phase(), "PARACHUTE_DESCENT");
        pass(&mut runner, &mut ctx, 1000, 290.0);
        assert_eq!(ctx.seq.phase(), "TP_DESCENT");
    }

    #[test]
    fn no_actuation_above_all_thresholds() {
        let (mut runner, mut ctx) = rig();
        pass(&mut runner, &mut ctx, 0, 700.0);
        assert_eq!(ctx.hw.parachute, 0);
        assert_eq!(ctx.hw.release, 0);
        assert_eq!(ctx.hw.beacon, 0);
        assert!(ctx.hw.rates.is_empty());
    }
}
