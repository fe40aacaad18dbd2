//! Unified error types for the container firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level control loop's error handling uniform. All variants are
//! `Copy` so they can be passed around without allocation. Note that
//! scheduler callbacks never return errors at all; a fault inside a
//! task is the task's own business and is logged where it happens.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A radio-link operation failed.
    Link(LinkError),
    /// An uplinked command could not be interpreted.
    Command(CommandError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Radio-link errors
// ---------------------------------------------------------------------------

/// Failures of the shared-radio link layer. None of these are fatal: a
/// timed-out switch leaves the link state unknown and is retried
/// opportunistically on the next poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The radio did not acknowledge a link-identifier switch in time.
    SwitchTimedOut,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwitchTimedOut => write!(f, "link switch timed out"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Why an uplinked line failed to parse into a command. These map to the
/// `Invalid` command variant at the dispatch boundary: logged, no state
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The line is not a recognised record shape at all.
    Malformed,
    /// The team identifier field does not match this vehicle.
    WrongTeam,
    /// A numeric or time field failed to parse or is out of range.
    BadArgument,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed command line"),
            Self::WrongTeam => write!(f, "team id mismatch"),
            Self::BadArgument => write!(f, "bad command argument"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
