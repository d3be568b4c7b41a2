// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::poll::{DEFAULT_FOUND_GRACE_MINS, DEFAULT_POLL_INTERVAL_SECS, PollParams};
use crate::schedule::{DEFAULT_LOOKAHEAD_MINS, ScheduleComputer, ScheduleParams};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// poll_interval_secs = 30
/// lookahead_mins = 10
/// found_grace_mins = 60
/// shutdown_grace_secs = 5
/// timezone = "America/Los_Angeles"
///
/// [store]
/// path = "reminders.json"
///
/// [arrivals]
/// base_url = "https://api.pugetsound.onebusaway.org"
/// api_key = "TEST"
/// timeout_secs = 10
///
/// [notifications]
/// default_title = "Tripwatch"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: RawEngineSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub arrivals: ArrivalsSection,

    #[serde(default)]
    pub notifications: NotificationsSection,
}

/// `[engine]` section as written. The time zone is still a name here; it is
/// resolved during validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEngineSection {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_lookahead_mins")]
    pub lookahead_mins: u32,

    #[serde(default = "default_found_grace_mins")]
    pub found_grace_mins: u32,

    /// How long shutdown waits for running operations to finish.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    /// IANA zone name used for "today" and departure times.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_lookahead_mins() -> u32 {
    DEFAULT_LOOKAHEAD_MINS as u32
}

fn default_found_grace_mins() -> u32 {
    DEFAULT_FOUND_GRACE_MINS as u32
}

fn default_shutdown_grace_secs() -> u64 {
    5
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for RawEngineSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            lookahead_mins: default_lookahead_mins(),
            found_grace_mins: default_found_grace_mins(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            timezone: default_timezone(),
        }
    }
}

/// Validated `[engine]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSection {
    pub poll_interval_secs: u64,
    pub lookahead_mins: u32,
    pub found_grace_mins: u32,
    pub shutdown_grace_secs: u64,
    pub timezone: Tz,
}

impl Default for EngineSection {
    fn default() -> Self {
        let raw = RawEngineSection::default();
        Self {
            poll_interval_secs: raw.poll_interval_secs,
            lookahead_mins: raw.lookahead_mins,
            found_grace_mins: raw.found_grace_mins,
            shutdown_grace_secs: raw.shutdown_grace_secs,
            timezone: Tz::UTC,
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreSection {
    /// JSON file holding the reminders. Relative paths resolve against the
    /// working directory.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("reminders.json")
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// `[arrivals]` section: where live predictions come from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArrivalsSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.pugetsound.onebusaway.org".to_string()
}

fn default_api_key() -> String {
    "TEST".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ArrivalsSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[notifications]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NotificationsSection {
    /// Title for reminders saved without a display name.
    #[serde(default = "default_title")]
    pub default_title: String,
}

fn default_title() -> String {
    "Tripwatch".to_string()
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            default_title: default_title(),
        }
    }
}

/// Validated configuration. Build one with
/// [`load_and_validate`](crate::config::load_and_validate) or
/// `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub store: StoreSection,
    pub arrivals: ArrivalsSection,
    pub notifications: NotificationsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        engine: EngineSection,
        store: StoreSection,
        arrivals: ArrivalsSection,
        notifications: NotificationsSection,
    ) -> Self {
        Self {
            engine,
            store,
            arrivals,
            notifications,
        }
    }

    pub fn schedule_params(&self) -> ScheduleParams {
        ScheduleParams {
            lookahead: Duration::minutes(i64::from(self.engine.lookahead_mins)),
        }
    }

    pub fn poll_params(&self) -> PollParams {
        PollParams {
            interval: StdDuration::from_secs(self.engine.poll_interval_secs),
            lookahead: Duration::minutes(i64::from(self.engine.lookahead_mins)),
            found_grace: Duration::minutes(i64::from(self.engine.found_grace_mins)),
        }
    }

    pub fn schedule_computer(&self) -> ScheduleComputer {
        ScheduleComputer::new(self.engine.timezone, self.schedule_params())
    }

    pub fn shutdown_grace(&self) -> StdDuration {
        StdDuration::from_secs(self.engine.shutdown_grace_secs)
    }
}
