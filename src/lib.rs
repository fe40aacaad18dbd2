//! Container flight-control firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. Everything in here is host-runnable: the hardware
//! (barometer, XBee-class radio, servos, buzzer, RTC) is reached
//! exclusively through the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod altimeter;
pub mod app;
pub mod config;
pub mod error;
pub mod radio;
pub mod runner;
pub mod sequencer;
pub mod telemetry;
pub mod vehicle;
