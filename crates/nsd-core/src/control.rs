//! The control-channel line protocol (`spec.md` section 6): a small set
//! of text commands an operator-facing tool sends down a socket, parsed
//! and formatted here with no TLS/socket handling of its own (that stays
//! out of scope, same as in `spec.md` section 1).

use std::fmt;

use nsd_proto::rr::Name;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Asks the daemon to shut down.
    Stop,
    /// `reload` with no zone asks every zone to pick up its difflog;
    /// `reload <zone>` names one.
    Reload { zone: Option<Name> },
    Notify { zone: Name },
    ZoneStatus { zone: Name },
    /// Overall daemon status (uptime, zone count, version-style info).
    Status,
    /// Statistics since the last `stats`/`stats_noreset`, resetting the
    /// counters afterward.
    Stats,
    /// Same as `stats` but leaves the counters untouched.
    StatsNoReset,
    /// Asks the daemon to close and reopen its log file (post log-rotation).
    LogReopen,
    /// `addzone <name> <pattern>`: registers a new zone under the named
    /// configuration pattern.
    AddZone { name: Name, pattern: String },
    DelZone { zone: Name },
    /// Changes the running verbosity level.
    Verbosity { level: u8 },
}

impl Command {
    pub fn parse(line: &str) -> CoreResult<Self> {
        let mut parts = line.trim().split_whitespace();
        let verb = parts.next().ok_or_else(|| CoreError::BadCommand(line.to_string()))?;
        let rest: Vec<&str> = parts.collect();

        let one_zone = |rest: &[&str]| -> CoreResult<Name> {
            match rest {
                [zone] => parse_name(zone),
                _ => Err(CoreError::BadCommand(line.to_string())),
            }
        };
        let no_args = |rest: &[&str], command: Command| -> CoreResult<Command> {
            if rest.is_empty() {
                Ok(command)
            } else {
                Err(CoreError::BadCommand(line.to_string()))
            }
        };

        match verb {
            "stop" => no_args(&rest, Command::Stop),
            "reload" => match rest.as_slice() {
                [] => Ok(Command::Reload { zone: None }),
                [zone] => Ok(Command::Reload { zone: Some(parse_name(zone)?) }),
                _ => Err(CoreError::BadCommand(line.to_string())),
            },
            "notify" => Ok(Command::Notify { zone: one_zone(&rest)? }),
            "zonestatus" => Ok(Command::ZoneStatus { zone: one_zone(&rest)? }),
            "status" => no_args(&rest, Command::Status),
            "stats" => no_args(&rest, Command::Stats),
            "stats_noreset" => no_args(&rest, Command::StatsNoReset),
            "log_reopen" => no_args(&rest, Command::LogReopen),
            "addzone" => match rest.as_slice() {
                [zone, pattern] => Ok(Command::AddZone { name: parse_name(zone)?, pattern: pattern.to_string() }),
                _ => Err(CoreError::BadCommand(line.to_string())),
            },
            "delzone" => Ok(Command::DelZone { zone: one_zone(&rest)? }),
            "verbosity" => match rest.as_slice() {
                [level] => Ok(Command::Verbosity {
                    level: level.parse().map_err(|_| CoreError::BadCommand(line.to_string()))?,
                }),
                _ => Err(CoreError::BadCommand(line.to_string())),
            },
            _ => Err(CoreError::BadCommand(line.to_string())),
        }
    }
}

fn parse_name(text: &str) -> CoreResult<Name> {
    Name::parse(text, None).map_err(|_| CoreError::BadCommand(text.to_string()))
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Stop => write!(f, "stop"),
            Command::Reload { zone: Some(zone) } => write!(f, "reload {zone}"),
            Command::Reload { zone: None } => write!(f, "reload"),
            Command::Notify { zone } => write!(f, "notify {zone}"),
            Command::ZoneStatus { zone } => write!(f, "zonestatus {zone}"),
            Command::Status => write!(f, "status"),
            Command::Stats => write!(f, "stats"),
            Command::StatsNoReset => write!(f, "stats_noreset"),
            Command::LogReopen => write!(f, "log_reopen"),
            Command::AddZone { name, pattern } => write!(f, "addzone {name} {pattern}"),
            Command::DelZone { zone } => write!(f, "delzone {zone}"),
            Command::Verbosity { level } => write!(f, "verbosity {level}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Error(String),
    ZoneStatus { zone: Name, serial: Option<u32>, state: String },
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "ok"),
            Reply::Error(message) => write!(f, "error {message}"),
            Reply::ZoneStatus { zone, serial: Some(serial), state } => {
                write!(f, "zone {zone} serial {serial} state {state}")
            }
            Reply::ZoneStatus { zone, serial: None, state } => {
                write!(f, "zone {zone} serial none state {state}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_with_no_zone_parses() {
        assert_eq!(Command::parse("reload").unwrap(), Command::Reload { zone: None });
    }

    #[test]
    fn reload_with_a_zone_parses_and_round_trips() {
        let command = Command::parse("reload example.com.").unwrap();
        assert_eq!(command, Command::Reload { zone: Some(Name::parse("example.com.", None).unwrap()) });
        assert_eq!(command.to_string(), "reload example.com.");
    }

    #[test]
    fn an_unknown_verb_is_rejected() {
        assert!(matches!(Command::parse("frobnicate"), Err(CoreError::BadCommand(_))));
    }

    #[test]
    fn notify_requires_exactly_one_zone() {
        assert!(Command::parse("notify").is_err());
        assert!(Command::parse("notify a.example. b.example.").is_err());
        assert!(Command::parse("notify example.com.").is_ok());
    }

    #[test]
    fn no_argument_verbs_parse_and_reject_trailing_args() {
        assert_eq!(Command::parse("stop").unwrap(), Command::Stop);
        assert_eq!(Command::parse("status").unwrap(), Command::Status);
        assert_eq!(Command::parse("stats").unwrap(), Command::Stats);
        assert_eq!(Command::parse("stats_noreset").unwrap(), Command::StatsNoReset);
        assert_eq!(Command::parse("log_reopen").unwrap(), Command::LogReopen);
        assert!(Command::parse("stop now").is_err());
    }

    #[test]
    fn addzone_requires_a_name_and_a_pattern() {
        let command = Command::parse("addzone example.com. primary").unwrap();
        assert_eq!(
            command,
            Command::AddZone { name: Name::parse("example.com.", None).unwrap(), pattern: "primary".to_string() }
        );
        assert_eq!(command.to_string(), "addzone example.com. primary");
        assert!(Command::parse("addzone example.com.").is_err());
        assert!(Command::parse("addzone").is_err());
    }

    #[test]
    fn verbosity_requires_a_numeric_level() {
        assert_eq!(Command::parse("verbosity 3").unwrap(), Command::Verbosity { level: 3 });
        assert!(Command::parse("verbosity").is_err());
        assert!(Command::parse("verbosity loud").is_err());
    }

    #[test]
    fn a_zonestatus_reply_formats_with_its_serial() {
        let reply = Reply::ZoneStatus {
            zone: Name::parse("example.com.", None).unwrap(),
            serial: Some(42),
            state: "ok".to_string(),
        };
        assert_eq!(reply.to_string(), "zone example.com. serial 42 state ok");
    }
}
