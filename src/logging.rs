// src/logging.rs

//! Daemon and CLI logging on STDERR.
//!
//! The `tripwatch` target logs at the level chosen by `--log-level`, else
//! `TRIPWATCH_LOG`, else `info`. The HTTP stack (`reqwest`, `hyper`) is held
//! at `warn` so a poll loop does not flood the log with connection chatter.
//! `list` and `plan` print on stdout, which stays free of log lines.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "TRIPWATCH_LOG";

/// Install the global subscriber. Call once, before the engine starts.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let level = resolve_level(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter_for(level))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

/// Pick the level for the `tripwatch` target.
///
/// An unparseable env value is ignored rather than rejected.
pub fn resolve_level(cli_level: Option<LogLevel>, env: Option<&str>) -> Level {
    if let Some(lvl) = cli_level {
        return match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        };
    }
    env.and_then(parse_level).unwrap_or(Level::INFO)
}

/// Filter directives: our crate at `level`, the HTTP client at `warn` or
/// quieter.
pub fn filter_for(level: Level) -> EnvFilter {
    let http = if level < Level::WARN { level } else { Level::WARN };
    let directives = format!("warn,tripwatch={level},reqwest={http},hyper={http}");
    EnvFilter::new(directives.to_lowercase())
}

fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
