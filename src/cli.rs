// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::reminder::{RepeatDays, parse_time_of_day};

/// Command-line arguments for `tripwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tripwatch",
    version,
    about = "Schedule trip reminders and poll live arrivals until it is time to leave.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// A missing file means built-in defaults.
    #[arg(long, global = true, value_name = "PATH", default_value = "Tripwatch.toml")]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TRIPWATCH_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the reminder daemon until Ctrl-C.
    Run,
    /// Create or replace a reminder.
    Add(AddArgs),
    /// Delete a reminder.
    Remove(ReminderKeyArgs),
    /// Print stored reminders.
    List,
    /// Print the poll triggers that would be armed right now.
    Plan,
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    #[arg(long, value_name = "ID")]
    pub trip: String,

    #[arg(long, value_name = "ID")]
    pub stop: String,

    #[arg(long, value_name = "ID")]
    pub route: String,

    #[arg(long, default_value = "")]
    pub headsign: String,

    /// Shown as the notification title.
    #[arg(long, default_value = "")]
    pub name: String,

    /// Scheduled local departure time, `HH:MM`.
    #[arg(long, value_name = "HH:MM", value_parser = parse_time_of_day)]
    pub departure: u16,

    /// Minutes before departure to notify (0, 1, 3, 5, 10, 15, 20, 25, 30).
    #[arg(long, value_name = "MINUTES", default_value_t = 10)]
    pub lead: u32,

    /// `once`, `daily`, `weekdays`, `weekends` or e.g. `mon,wed,fri`.
    #[arg(long, value_name = "DAYS", default_value = "once", value_parser = parse_repeat_days)]
    pub days: RepeatDays,
}

#[derive(Debug, Clone, Args)]
pub struct ReminderKeyArgs {
    #[arg(long, value_name = "ID")]
    pub trip: String,

    #[arg(long, value_name = "ID")]
    pub stop: String,
}

fn parse_repeat_days(s: &str) -> Result<RepeatDays, String> {
    s.parse()
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
