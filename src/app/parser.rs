//! Text grammar for the ground uplink.
//!
//! Lines are comma-separated records. Command records carry the team
//! identifier so a mis-routed frame for another vehicle is rejected,
//! not obeyed:
//!
//! ```text
//! CMD,<TEAM_ID>,CX,ON|OFF          telemetry on/off
//! CMD,<TEAM_ID>,ST,hh:mm:ss        set UTC wall clock
//! CMD,<TEAM_ID>,SIM,ENABLE|ACTIVATE|DISABLE
//! CMD,<TEAM_ID>,SIMP,<pascals>     simulated pressure override
//! CMD,<TEAM_ID>,<VERB>[,...]       any other verb → Named
//! TPD,<metres>                     tethered-payload depth report
//! ```

use log::warn;

use crate::error::CommandError;

use super::commands::{Command, SimCommand};

/// Parse one received line. Total: every input maps to a variant, with
/// anything unintelligible becoming [`Command::Invalid`] (logged here
/// with the reason).
pub fn parse(team_id: u16, line: &str) -> Command {
    match try_parse(team_id, line.trim()) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!("uplink rejected ({e}): {line:?}");
            Command::Invalid
        }
    }
}

fn try_parse(team_id: u16, line: &str) -> Result<Command, CommandError> {
    let mut fields = line.split(',');
    match fields.next().ok_or(CommandError::Malformed)? {
        "CMD" => {
            let id: u16 = fields
                .next()
                .ok_or(CommandError::Malformed)?
                .parse()
                .map_err(|_| CommandError::Malformed)?;
            if id != team_id {
                return Err(CommandError::WrongTeam);
            }
            let verb = fields.next().ok_or(CommandError::Malformed)?;
            let arg = fields.next();
            parse_verb(verb, arg)
        }
        "TPD" => {
            let depth = parse_f32(fields.next().ok_or(CommandError::Malformed)?)?;
            Ok(Command::PayloadDepth(depth))
        }
        _ => Err(CommandError::Malformed),
    }
}

fn parse_verb(verb: &str, arg: Option<&str>) -> Result<Command, CommandError> {
    match verb {
        "CX" => match arg {
            Some("ON") => Ok(Command::SetTelemetry(true)),
            Some("OFF") => Ok(Command::SetTelemetry(false)),
            _ => Err(CommandError::BadArgument),
        },
        "ST" => parse_time(arg.ok_or(CommandError::BadArgument)?),
        "SIM" => match arg {
            Some("ENABLE") => Ok(Command::SetSimMode(SimCommand::Enable)),
            Some("ACTIVATE") => Ok(Command::SetSimMode(SimCommand::Activate)),
            Some("DISABLE") => Ok(Command::SetSimMode(SimCommand::Disable)),
            _ => Err(CommandError::BadArgument),
        },
        "SIMP" => {
            let pa = parse_f32(arg.ok_or(CommandError::BadArgument)?)?;
            if pa <= 0.0 {
                return Err(CommandError::BadArgument);
            }
            Ok(Command::SetSimPressure(pa))
        }
        other if !other.is_empty() => {
            let mut name = heapless::String::new();
            name.push_str(other)
                .map_err(|_| CommandError::BadArgument)?;
            Ok(Command::Named(name))
        }
        _ => Err(CommandError::Malformed),
    }
}

fn parse_time(arg: &str) -> Result<Command, CommandError> {
    let mut parts = arg.split(':');
    let hour = parse_u8(parts.next().ok_or(CommandError::BadArgument)?)?;
    let minute = parse_u8(parts.next().ok_or(CommandError::BadArgument)?)?;
    let second = parse_u8(parts.next().ok_or(CommandError::BadArgument)?)?;
    if parts.next().is_some() || hour > 23 || minute > 59 || second > 59 {
        return Err(CommandError::BadArgument);
    }
    Ok(Command::SetTime {
        hour,
        minute,
        second,
    })
}

fn parse_u8(s: &str) -> Result<u8, CommandError> {
    s.parse().map_err(|_| CommandError::BadArgument)
}

fn parse_f32(s: &str) -> Result<f32, CommandError> {
    let v: f32 = s.parse().map_err(|_| CommandError::BadArgument)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CommandError::BadArgument)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM: u16 = 1057;

    #[test]
    fn telemetry_toggle() {
        assert_eq!(parse(TEAM, "CMD,1057,CX,ON"), Command::SetTelemetry(true));
        assert_eq!(parse(TEAM, "CMD,1057,CX,OFF"), Command::SetTelemetry(false));
        assert_eq!(parse(TEAM, "CMD,1057,CX,MAYBE"), Command::Invalid);
    }

    #[test]
    fn set_time() {
        assert_eq!(
            parse(TEAM, "CMD,1057,ST,13:23:05"),
            Command::SetTime {
                hour: 13,
                minute: 23,
                second: 5
            }
        );
        assert_eq!(parse(TEAM, "CMD,1057,ST,25:00:00"), Command::Invalid);
        assert_eq!(parse(TEAM, "CMD,1057,ST,12:61:00"), Command::Invalid);
        assert_eq!(parse(TEAM, "CMD,1057,ST,12:00"), Command::Invalid);
    }

    #[test]
    fn sim_mode_sequence() {
        assert_eq!(
            parse(TEAM, "CMD,1057,SIM,ENABLE"),
            Command::SetSimMode(SimCommand::Enable)
        );
        assert_eq!(
            parse(TEAM, "CMD,1057,SIM,ACTIVATE"),
            Command::SetSimMode(SimCommand::Activate)
        );
        assert_eq!(
            parse(TEAM, "CMD,1057,SIM,DISABLE"),
            Command::SetSimMode(SimCommand::Disable)
        );
    }

    #[test]
    fn sim_pressure() {
        assert_eq!(
            parse(TEAM, "CMD,1057,SIMP,101325"),
            Command::SetSimPressure(101_325.0)
        );
        assert_eq!(parse(TEAM, "CMD,1057,SIMP,-5"), Command::Invalid);
        assert_eq!(parse(TEAM, "CMD,1057,SIMP,pancake"), Command::Invalid);
    }

    #[test]
    fn unknown_verb_becomes_named() {
        match parse(TEAM, "CMD,1057,CAL,0") {
            Command::Named(name) => assert_eq!(name.as_str(), "CAL"),
            other => panic!("expected Named, got {other:?}"),
        }
    }

    #[test]
    fn payload_depth_report() {
        assert_eq!(parse(TEAM, "TPD,3.7"), Command::PayloadDepth(3.7));
        assert_eq!(parse(TEAM, "TPD,abc"), Command::Invalid);
    }

    #[test]
    fn wrong_team_is_rejected() {
        assert_eq!(parse(TEAM, "CMD,2051,CX,ON"), Command::Invalid);
    }

    #[test]
    fn garbage_is_invalid_not_a_panic() {
        for line in ["", ",,,,", "CMD", "CMD,1057", "hello world", "CX,ON"] {
            assert_eq!(parse(TEAM, line), Command::Invalid, "line: {line:?}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(
            parse(TEAM, "  CMD,1057,CX,ON\r\n"),
            Command::SetTelemetry(true)
        );
    }
}
