//! Administrative commands
//!
//! Text commands that map directly onto registry and engine queries:
//!
//! ```text
//! reload
//! durations
//! duration <add|set> <name> <seconds|m:ss>
//! give [recipient] [amount]
//! status <world,x,y,z>
//! ```

use crate::config::PlaybackSettings;
use crate::durations::{catalog, DurationRegistry};
use crate::error::{Error, Result};
use crate::units::UnitRegistry;
use mbx_common::human_time::{format_minutes_seconds, parse_duration_secs};
use mbx_common::Location;
use tracing::{info, warn};

pub const USAGE: &str = "Usage: give [recipient] [amount] | status <world,x,y,z> | reload | durations | duration <add|set> <name> <seconds>";

/// `duration add` vs `duration set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationOp {
    /// Register any type, prefixing `MUSIC_DISC_` when missing
    Add,
    /// Change a catalog or already registered type
    Set,
}

/// Parsed administrative command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Reload,
    Durations,
    Duration {
        op: DurationOp,
        name: String,
        seconds: String,
    },
    Give {
        recipient: Option<String>,
        amount: Option<String>,
    },
    Status(Location),
}

/// What an admin command may read or update
pub struct AdminContext<'a> {
    pub durations: &'a DurationRegistry,
    pub units: &'a UnitRegistry,
    pub settings: &'a PlaybackSettings,
}

impl AdminCommand {
    /// Parse whitespace-separated tokens; `None` if the verb is not an
    /// admin command
    pub fn parse(tokens: &[&str]) -> Option<Result<Self>> {
        let (verb, args) = tokens.split_first()?;
        let command = match verb.to_ascii_lowercase().as_str() {
            "reload" => Ok(AdminCommand::Reload),
            "durations" | "discs" => Ok(AdminCommand::Durations),
            "duration" | "disc" => Self::parse_duration(args),
            "give" => Ok(AdminCommand::Give {
                recipient: args
                    .first()
                    .filter(|arg| arg.parse::<i64>().is_err())
                    .map(|arg| arg.to_string()),
                amount: args
                    .iter()
                    .find(|arg| arg.parse::<i64>().is_ok())
                    .or_else(|| args.get(1))
                    .map(|arg| arg.to_string()),
            }),
            "status" => match args.first() {
                Some(arg) => arg.parse::<Location>().map(AdminCommand::Status).map_err(Error::from),
                None => Err(Error::InvalidInput("Usage: status <world,x,y,z>".to_string())),
            },
            _ => return None,
        };
        Some(command)
    }

    fn parse_duration(args: &[&str]) -> Result<Self> {
        let usage = || Error::InvalidInput("Usage: duration <add|set> <name> <seconds>".to_string());
        let [op, name, seconds, ..] = args else {
            return Err(usage());
        };
        let op = match op.to_ascii_lowercase().as_str() {
            "add" => DurationOp::Add,
            "set" => DurationOp::Set,
            _ => return Err(usage()),
        };
        Ok(AdminCommand::Duration {
            op,
            name: name.to_ascii_uppercase(),
            seconds: seconds.to_string(),
        })
    }

    /// Run the command and return reply lines
    pub fn execute(&self, ctx: &AdminContext<'_>) -> Vec<String> {
        match self {
            AdminCommand::Reload => {
                let count = ctx.durations.reload();
                info!("Durations reloaded by command ({} entries)", count);
                vec!["MultiBox durations reloaded".to_string()]
            }
            AdminCommand::Durations => {
                let mut lines = vec!["Durations:".to_string()];
                lines.extend(ctx.durations.list().into_iter().map(|entry| {
                    format!(
                        "{}: {}{}",
                        entry.kind,
                        format_minutes_seconds(entry.seconds as i64),
                        if entry.known { "" } else { " (custom)" }
                    )
                }));
                lines
            }
            AdminCommand::Duration { op, name, seconds } => {
                vec![update_duration(ctx.durations, *op, name, seconds)]
            }
            AdminCommand::Give { recipient, amount } => give(recipient.as_deref(), amount.as_deref(), ctx.settings),
            AdminCommand::Status(location) => {
                let reply = match ctx.units.nearest(location, ctx.settings.status_radius) {
                    Some(engine) => format!(
                        "MultiBox at {}: {}",
                        engine.location().block_coords(),
                        engine.playback_info()
                    ),
                    None => format!(
                        "No MultiBox found within {} blocks.",
                        ctx.settings.status_radius
                    ),
                };
                vec![reply]
            }
        }
    }
}

fn update_duration(durations: &DurationRegistry, op: DurationOp, name: &str, seconds: &str) -> String {
    let seconds = match parse_duration_secs(seconds) {
        Some(secs) if secs <= 0 => return "Duration must be greater than 0 seconds".to_string(),
        Some(secs) => match u32::try_from(secs) {
            Ok(secs) => secs,
            Err(_) => return format!("Invalid duration: {}", seconds),
        },
        None => return format!("Invalid duration: {}", seconds),
    };

    let mut kind = name.to_ascii_uppercase();
    match op {
        DurationOp::Add if !kind.starts_with(catalog::KIND_PREFIX) => {
            kind = format!("{}{}", catalog::KIND_PREFIX, kind);
        }
        DurationOp::Set if !catalog::is_known(&kind) && !durations.contains(&kind) => {
            return format!("Unknown item type: {}", kind);
        }
        _ => {}
    }

    match durations.update(&kind, seconds) {
        Ok(()) => format!(
            "Updated {} duration to {}",
            kind,
            format_minutes_seconds(i64::from(seconds))
        ),
        Err(e) => {
            warn!("Duration update for {} failed: {}", kind, e);
            "Failed to update duration".to_string()
        }
    }
}

fn give(recipient: Option<&str>, amount: Option<&str>, settings: &PlaybackSettings) -> Vec<String> {
    let mut lines = Vec::new();
    let max = i64::from(settings.max_give_amount);
    let amount = match amount.map(str::parse::<i64>) {
        None => 1,
        Some(Ok(n)) => n.clamp(1, max),
        Some(Err(_)) => {
            lines.push(format!(
                "Invalid amount: {}. Using 1 instead.",
                amount.unwrap_or_default()
            ));
            1
        }
    };

    let Some(recipient) = recipient else {
        lines.push("Please specify a recipient when using this command from console".to_string());
        return lines;
    };

    info!("Giving {} MultiBox units to {}", amount, recipient);
    lines.push(format!(
        "Gave {} MultiBox{} to {}",
        amount,
        if amount > 1 { "es" } else { "" },
        recipient
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tokens(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    fn parse(line: &str) -> Result<AdminCommand> {
        AdminCommand::parse(&tokens(line)).expect("admin verb")
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("reload").unwrap(), AdminCommand::Reload);
        assert_eq!(parse("DURATIONS").unwrap(), AdminCommand::Durations);
        assert_eq!(
            parse("duration add cool 90").unwrap(),
            AdminCommand::Duration {
                op: DurationOp::Add,
                name: "COOL".to_string(),
                seconds: "90".to_string()
            }
        );
        assert_eq!(
            parse("give alex 5").unwrap(),
            AdminCommand::Give {
                recipient: Some("alex".to_string()),
                amount: Some("5".to_string())
            }
        );
        assert_eq!(
            parse("give 3").unwrap(),
            AdminCommand::Give {
                recipient: None,
                amount: Some("3".to_string())
            }
        );
        assert_eq!(
            parse("status world,1,2,3").unwrap(),
            AdminCommand::Status(Location::new("world", 1, 2, 3))
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse("duration add cool").is_err());
        assert!(parse("duration remove cool 9").is_err());
        assert!(parse("status").is_err());
        assert!(parse("status nowhere").is_err());
        assert!(AdminCommand::parse(&tokens("place world,0,0,0")).is_none());
        assert!(AdminCommand::parse(&[]).is_none());
    }

    #[test]
    fn test_give_clamps_and_requires_recipient() {
        let settings = PlaybackSettings::default();
        assert_eq!(give(Some("alex"), Some("500"), &settings), vec!["Gave 64 MultiBoxes to alex"]);
        assert_eq!(give(Some("alex"), Some("0"), &settings), vec!["Gave 1 MultiBox to alex"]);
        assert_eq!(
            give(Some("alex"), Some("lots"), &settings),
            vec!["Invalid amount: lots. Using 1 instead.", "Gave 1 MultiBox to alex"]
        );
        assert_eq!(give(None, None, &settings).len(), 1);
    }

    #[test]
    fn test_duration_add_set() {
        let dir = TempDir::new().unwrap();
        let durations = DurationRegistry::load(dir.path().join("item_durations.toml"), 180);

        assert_eq!(
            update_duration(&durations, DurationOp::Add, "COOL", "1:30"),
            "Updated MUSIC_DISC_COOL duration to 1:30"
        );
        assert_eq!(durations.lookup("MUSIC_DISC_COOL").ticks(), 1800);

        assert_eq!(
            update_duration(&durations, DurationOp::Set, "MUSIC_DISC_CAT", "200"),
            "Updated MUSIC_DISC_CAT duration to 3:20"
        );
        assert_eq!(
            update_duration(&durations, DurationOp::Set, "MUSIC_DISC_NOPE", "200"),
            "Unknown item type: MUSIC_DISC_NOPE"
        );
        assert_eq!(
            update_duration(&durations, DurationOp::Add, "COOL", "0"),
            "Duration must be greater than 0 seconds"
        );
        assert_eq!(
            update_duration(&durations, DurationOp::Add, "COOL", "soon"),
            "Invalid duration: soon"
        );
        assert_eq!(
            update_duration(&durations, DurationOp::Add, "COOL", "999999999999999999:00"),
            "Invalid duration: 999999999999999999:00"
        );
        assert_eq!(durations.lookup("MUSIC_DISC_COOL").ticks(), 1800);
    }

    #[test]
    fn test_update_takes_effect_without_reload() {
        let dir = TempDir::new().unwrap();
        let durations = DurationRegistry::load(dir.path().join("item_durations.toml"), 180);
        let writes = durations.store_writes();

        update_duration(&durations, DurationOp::Set, "MUSIC_DISC_FAR", "2:00");
        assert_eq!(durations.lookup("MUSIC_DISC_FAR").ticks(), 2400);
        assert_eq!(durations.store_writes(), writes + 1);
    }
}
