//! Application core: pure domain logic, zero I/O.
//!
//! The command model for the ground uplink: the typed command set
//! ([`commands`]), the text-grammar parser ([`parser`]), the dispatch
//! visitor that turns a command into exactly one side effect
//! ([`dispatch`]), and the port traits that keep hardware out of the
//! domain ([`ports`]).

pub mod commands;
pub mod dispatch;
pub mod parser;
pub mod ports;
