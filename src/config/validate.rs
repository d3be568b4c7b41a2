// src/config/validate.rs

use chrono_tz::Tz;

use crate::config::model::{ConfigFile, EngineSection, RawConfigFile, RawEngineSection};
use crate::errors::{Result, TripwatchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TripwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let engine = resolve_engine(raw.engine)?;
        Ok(ConfigFile::new_unchecked(
            engine,
            raw.store,
            raw.arrivals,
            raw.notifications,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(&cfg.engine)?;
    validate_store(cfg)?;
    validate_arrivals(cfg)?;
    Ok(())
}

fn validate_engine(engine: &RawEngineSection) -> Result<()> {
    if engine.poll_interval_secs == 0 {
        return Err(TripwatchError::ConfigError(
            "[engine].poll_interval_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_store(cfg: &RawConfigFile) -> Result<()> {
    if cfg.store.path.as_os_str().is_empty() {
        return Err(TripwatchError::ConfigError(
            "[store].path must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_arrivals(cfg: &RawConfigFile) -> Result<()> {
    if cfg.arrivals.base_url.trim().is_empty() {
        return Err(TripwatchError::ConfigError(
            "[arrivals].base_url must not be empty".to_string(),
        ));
    }
    if cfg.arrivals.timeout_secs == 0 {
        return Err(TripwatchError::ConfigError(
            "[arrivals].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn resolve_engine(raw: RawEngineSection) -> Result<EngineSection> {
    let timezone: Tz = raw.timezone.parse().map_err(|_| {
        TripwatchError::ConfigError(format!(
            "[engine].timezone '{}' is not a known time zone",
            raw.timezone
        ))
    })?;

    Ok(EngineSection {
        poll_interval_secs: raw.poll_interval_secs,
        lookahead_mins: raw.lookahead_mins,
        found_grace_mins: raw.found_grace_mins,
        shutdown_grace_secs: raw.shutdown_grace_secs,
        timezone,
    })
}
