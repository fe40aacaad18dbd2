//! Radio link manager.
//!
//! One physical half-duplex radio is time-shared between two logical
//! point-to-point links by rewriting the shared link identifier:
//!
//! ```text
//! ┌─────────────┐   ground link id    ┌───────────────┐
//! │   ground    │◀───────────────────▶│               │
//! │   station   │   commands ▲        │   container   │
//! └─────────────┘   telemetry▼        │    (this)     │
//! ┌─────────────┐   payload link id   │               │
//! │   payload   │◀───────────────────▶│               │
//! └─────────────┘   (brief windows)   └───────────────┘
//! ```
//!
//! The ground link is the priority channel: whenever a poll finds the
//! radio off it (a crashed payload excursion, a timed-out restore),
//! the manager opportunistically switches back so uplinked commands
//! are not missed. Inbound frames are routed purely by sender address;
//! the manager owns the radio exclusively.

use log::{debug, info, warn};

use crate::app::commands::Command;
use crate::app::parser;
use crate::app::ports::{CommandSink, DownlinkSink, LinkStatus, RadioPort};
use crate::config::MissionConfig;
use crate::error::LinkError;

pub struct RadioLinkManager<R: RadioPort> {
    radio: R,
    team_id: u16,
    ground_link_id: u16,
    payload_link_id: u16,
    ground_addr: u16,
    payload_addr: u16,
    switch_timeout_ms: u32,
    /// Last link identifier confirmed by the radio (or the attempted
    /// startup value if no switch has ever been confirmed).
    active_link: u16,
    /// Whether `active_link` was actually acknowledged by the radio.
    /// Cleared on any timeout so a timed-out claim keeps being retried.
    link_confirmed: bool,
}

impl<R: RadioPort> RadioLinkManager<R> {
    /// Take ownership of the radio and claim the ground link. A timeout
    /// here is not fatal: `poll` self-heals on every cycle.
    pub fn new(radio: R, config: &MissionConfig) -> Self {
        let mut mgr = Self {
            radio,
            team_id: config.team_id,
            ground_link_id: config.ground_link_id,
            payload_link_id: config.payload_link_id,
            ground_addr: config.ground_addr,
            payload_addr: config.payload_addr,
            switch_timeout_ms: config.link_switch_timeout_ms,
            active_link: config.ground_link_id,
            link_confirmed: false,
        };
        match mgr.radio.set_link(config.ground_link_id, config.link_switch_timeout_ms) {
            LinkStatus::Confirmed => {
                info!("ground link {} claimed", config.ground_link_id);
                mgr.link_confirmed = true;
            }
            LinkStatus::TimedOut => {
                warn!("startup link switch timed out; will retry on poll");
            }
        }
        mgr
    }

    /// Switch the shared link identifier, blocking for at most
    /// `timeout_ms`. On timeout the link state is unknown and
    /// [`current_link`](Self::current_link) keeps its last confirmed
    /// value; the caller retries opportunistically.
    pub fn set_link(&mut self, id: u16, timeout_ms: u32) -> LinkStatus {
        let status = self.radio.set_link(id, timeout_ms);
        match status {
            LinkStatus::Confirmed => {
                debug!("link switch confirmed: {}", id);
                self.active_link = id;
                self.link_confirmed = true;
            }
            LinkStatus::TimedOut => {
                warn!("link switch to {} timed out (still on {})", id, self.active_link);
                self.link_confirmed = false;
            }
        }
        status
    }

    /// The last confirmed link identifier.
    pub fn current_link(&self) -> u16 {
        self.active_link
    }

    /// Service the radio. Called once per runner cycle, unconditionally.
    ///
    /// Restores the ground link first if the radio is off it, or if the
    /// last switch to it timed out and was never acknowledged, then
    /// drains inbound frames: ground-station frames are parsed and
    /// dispatched synchronously through `sink`, payload frames are
    /// handed over verbatim, frames from any other address are dropped
    /// (there is no third recognised remote in this topology).
    pub fn poll(&mut self, sink: &mut (impl CommandSink + DownlinkSink)) {
        if self.active_link != self.ground_link_id || !self.link_confirmed {
            debug!("ground link not confirmed; attempting restore");
            let _ = self.set_link(self.ground_link_id, self.switch_timeout_ms);
        }

        while let Some(frame) = self.radio.recv() {
            if frame.source == self.ground_addr {
                match core::str::from_utf8(&frame.payload) {
                    Ok(text) => {
                        let line = text.trim();
                        let cmd = parser::parse(self.team_id, line);
                        sink.on_command(cmd, line);
                    }
                    Err(_) => {
                        warn!("non-text frame from ground station");
                        sink.on_command(Command::Invalid, "");
                    }
                }
            } else if frame.source == self.payload_addr {
                sink.forward_payload(&frame.payload);
            } else {
                debug!("frame from unknown address {} discarded", frame.source);
            }
        }
    }

    /// Transmit on the ground downlink (telemetry, relayed payload
    /// frames). Fire-and-forget.
    pub fn send_ground(&mut self, payload: &[u8]) {
        self.radio.send(self.ground_addr, payload);
    }

    /// Briefly switch to the payload link, transmit, and restore the
    /// ground link: the one sanctioned window off the ground link.
    ///
    /// An error means the link state is unknown; the next `poll` heals
    /// it. If the outbound switch itself times out, nothing is sent.
    pub fn relay_to_payload(
        &mut self,
        payload: &[u8],
        timeout_ms: u32,
    ) -> crate::error::Result<()> {
        if self.set_link(self.payload_link_id, timeout_ms) == LinkStatus::TimedOut {
            return Err(LinkError::SwitchTimedOut.into());
        }
        self.radio.send(self.payload_addr, payload);
        if self.set_link(self.ground_link_id, timeout_ms) == LinkStatus::TimedOut {
            return Err(LinkError::SwitchTimedOut.into());
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
