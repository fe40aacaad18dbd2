//! Barometric altimeter with simulation-mode override.
//!
//! Converts pressure to altitude with the international barometric
//! formula against a fixed sea-level reference. In simulation mode the
//! physical sensor is ignored and the ground station supplies pressure
//! values over the uplink (`SIMP`), which lets the full actuation chain
//! be exercised on the bench.
//!
//! Readings are raw single samples: the sequencer's latches
//! make every decision one-shot, so no smoothing happens here. If the
//! sensor proves noisy in flight, filtering belongs in the pressure
//! source driver, not in this path.

use log::{info, warn};

use crate::app::commands::SimCommand;
use crate::app::ports::{BaroSample, PressureSource};

/// Scale height constant of the barometric formula (metres).
const BARO_SCALE_M: f32 = 44_330.0;
/// Exponent of the pressure ratio in the barometric formula.
const BARO_EXPONENT: f32 = 0.190_295;

/// Altitude above the sea-level reference for a given pressure.
pub fn pressure_to_altitude(pressure_pa: f32, sea_level_pa: f32) -> f32 {
    BARO_SCALE_M * (1.0 - (pressure_pa / sea_level_pa).powf(BARO_EXPONENT))
}

/// The altitude source for the actuation sequencer and telemetry.
pub struct BaroAltimeter<P: PressureSource> {
    source: P,
    sea_level_pa: f32,
    /// `SIM ENABLE` received: simulation may be activated.
    sim_enabled: bool,
    /// `SIM ACTIVATE` received after enable: simulated pressure is live.
    sim_active: bool,
    sim_pressure_pa: f32,
    /// Last good sensor sample, used when a read fails.
    last: BaroSample,
}

impl<P: PressureSource> BaroAltimeter<P> {
    pub fn new(source: P, sea_level_pa: f32) -> Self {
        Self {
            source,
            sea_level_pa,
            sim_enabled: false,
            sim_active: false,
            sim_pressure_pa: sea_level_pa,
            last: BaroSample {
                pressure_pa: sea_level_pa,
                temperature_c: 0.0,
            },
        }
    }

    /// Current altitude in metres. Falls back to the last good sample
    /// when the sensor read fails (never blocks, never errors out).
    pub fn read_altitude(&mut self) -> f32 {
        let pressure = if self.sim_active {
            self.sim_pressure_pa
        } else {
            if let Some(sample) = self.source.read() {
                self.last = sample;
            }
            self.last.pressure_pa
        };
        pressure_to_altitude(pressure, self.sea_level_pa)
    }

    /// Temperature from the most recent good sensor sample.
    pub fn temperature_c(&self) -> f32 {
        self.last.temperature_c
    }

    /// Apply a `SIM` uplink sub-command. Activation requires a prior
    /// enable; a lone `ACTIVATE` is ignored.
    pub fn apply_sim(&mut self, cmd: SimCommand) {
        match cmd {
            SimCommand::Enable => {
                self.sim_enabled = true;
                info!("simulation mode enabled (awaiting ACTIVATE)");
            }
            SimCommand::Activate => {
                if self.sim_enabled {
                    self.sim_active = true;
                    info!("simulation mode ACTIVE: altitude now ground-supplied");
                } else {
                    warn!("SIM ACTIVATE without prior ENABLE ignored");
                }
            }
            SimCommand::Disable => {
                self.sim_enabled = false;
                self.sim_active = false;
                info!("simulation mode disabled");
            }
        }
    }

    /// Set the simulated pressure. Ignored unless simulation has been
    /// enabled, so a stray `SIMP` cannot poison a live flight.
    pub fn set_sim_pressure(&mut self, pressure_pa: f32) {
        if self.sim_enabled {
            self.sim_pressure_pa = pressure_pa;
        } else {
            warn!("SIMP while simulation disabled ignored");
        }
    }

    pub fn is_sim_active(&self) -> bool {
        self.sim_active
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const SEA_LEVEL: f32 = 101_325.0;

    /// Pressure source scripted per-read.
    struct Scripted(Vec<Option<BaroSample>>);

    impl PressureSource for Scripted {
        fn read(&mut self) -> Option<BaroSample> {
            if self.0.is_empty() { None } else { self.0.remove(0) }
        }
    }

    fn sample(pressure_pa: f32) -> Option<BaroSample> {
        Some(BaroSample {
            pressure_pa,
            temperature_c: 21.5,
        })
    }

    #[test]
    fn sea_level_pressure_is_zero_altitude() {
        assert!(pressure_to_altitude(SEA_LEVEL, SEA_LEVEL).abs() < 0.01);
    }

    #[test]
    fn formula_matches_standard_atmosphere() {
        // ~1000 m in the standard atmosphere is ~89 875 Pa.
        let alt = pressure_to_altitude(89_875.0, SEA_LEVEL);
        assert!((alt - 1000.0).abs() < 15.0, "got {alt}");
        // Half sea-level pressure sits near 5 500 m.
        let alt = pressure_to_altitude(SEA_LEVEL / 2.0, SEA_LEVEL);
        assert!((5300.0..5700.0).contains(&alt), "got {alt}");
    }

    #[test]
    fn failed_read_falls_back_to_last_sample() {
        let mut alt = BaroAltimeter::new(Scripted(vec![sample(95_000.0), None]), SEA_LEVEL);
        let first = alt.read_altitude();
        let second = alt.read_altitude();
        assert!((first - second).abs() < 0.01);
        assert!((alt.temperature_c() - 21.5).abs() < 0.01);
    }

    #[test]
    fn sim_activation_requires_enable_first() {
        let mut alt = BaroAltimeter::new(Scripted(vec![]), SEA_LEVEL);
        alt.apply_sim(SimCommand::Activate);
        assert!(!alt.is_sim_active());

        alt.apply_sim(SimCommand::Enable);
        alt.apply_sim(SimCommand::Activate);
        assert!(alt.is_sim_active());

        alt.apply_sim(SimCommand::Disable);
        assert!(!alt.is_sim_active());
        // Disable also drops the enable arm: a lone ACTIVATE stays inert.
        alt.apply_sim(SimCommand::Activate);
        assert!(!alt.is_sim_active());
    }

    #[test]
    fn sim_pressure_drives_altitude_when_active() {
        let mut alt = BaroAltimeter::new(Scripted(vec![]), SEA_LEVEL);
        alt.apply_sim(SimCommand::Enable);
        alt.apply_sim(SimCommand::Activate);
        alt.set_sim_pressure(89_875.0);
        let reading = alt.read_altitude();
        assert!((reading - 1000.0).abs() < 15.0, "got {reading}");
    }

    #[test]
    fn simp_before_enable_is_ignored() {
        let mut alt = BaroAltimeter::new(Scripted(vec![]), SEA_LEVEL);
        alt.set_sim_pressure(50_000.0);
        alt.apply_sim(SimCommand::Enable);
        alt.apply_sim(SimCommand::Activate);
        // Still at the sea-level default, not the ignored override.
        assert!(alt.read_altitude().abs() < 0.01);
    }
}
