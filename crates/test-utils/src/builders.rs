#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use tripwatch::arrivals::ArrivalRecord;
use tripwatch::config::{ConfigFile, RawConfigFile};
use tripwatch::reminder::{RepeatDays, TripReminder, parse_time_of_day};

/// Builder for `TripReminder` to simplify test setup.
///
/// Defaults: route `R1`, departure 08:00, lead 10 minutes, one-time.
pub struct TripReminderBuilder {
    reminder: TripReminder,
}

impl TripReminderBuilder {
    pub fn new(trip_id: &str, stop_id: &str) -> Self {
        Self {
            reminder: TripReminder {
                trip_id: trip_id.to_string(),
                stop_id: stop_id.to_string(),
                route_id: "R1".to_string(),
                headsign: String::new(),
                display_name: String::new(),
                departure_time_of_day: 8 * 60,
                reminder_lead_minutes: 10,
                repeat_days: RepeatDays::ONCE,
            },
        }
    }

    pub fn route(mut self, route_id: &str) -> Self {
        self.reminder.route_id = route_id.to_string();
        self
    }

    pub fn headsign(mut self, headsign: &str) -> Self {
        self.reminder.headsign = headsign.to_string();
        self
    }

    pub fn name(mut self, display_name: &str) -> Self {
        self.reminder.display_name = display_name.to_string();
        self
    }

    /// Departure as `HH:MM`.
    pub fn departs(mut self, hh_mm: &str) -> Self {
        self.reminder.departure_time_of_day =
            parse_time_of_day(hh_mm).expect("valid HH:MM in test");
        self
    }

    pub fn departure_minutes(mut self, minutes: u16) -> Self {
        self.reminder.departure_time_of_day = minutes;
        self
    }

    pub fn lead(mut self, minutes: u32) -> Self {
        self.reminder.reminder_lead_minutes = minutes;
        self
    }

    pub fn repeat(mut self, days: RepeatDays) -> Self {
        self.reminder.repeat_days = days;
        self
    }

    pub fn on(mut self, days: &[Weekday]) -> Self {
        self.reminder.repeat_days = RepeatDays::from_days(days.iter().copied());
        self
    }

    pub fn build(self) -> TripReminder {
        self.reminder
    }
}

/// Builder for `ConfigFile`, going through the same validation as a file.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn timezone(mut self, name: &str) -> Self {
        self.config.engine.timezone = name.to_string();
        self
    }

    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.engine.poll_interval_secs = secs;
        self
    }

    pub fn found_grace_mins(mut self, mins: u32) -> Self {
        self.config.engine.found_grace_mins = mins;
        self
    }

    pub fn default_title(mut self, title: &str) -> Self {
        self.config.notifications.default_title = title.to_string();
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `y-m-d h:mi` as a UTC instant.
pub fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, mi, 0)
        .single()
        .expect("valid UTC timestamp in test")
}

/// A Sunday, for weekday-sensitive tests.
pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 2).expect("valid date")
}

/// Arrival record with a predicted time (and the same scheduled time).
pub fn predicted(trip_id: &str, at: DateTime<Utc>) -> ArrivalRecord {
    ArrivalRecord {
        trip_id: trip_id.to_string(),
        predicted_ms: at.timestamp_millis(),
        scheduled_ms: at.timestamp_millis(),
        route_short_name: None,
    }
}

/// Arrival record with only a scheduled time.
pub fn scheduled_only(trip_id: &str, at: DateTime<Utc>) -> ArrivalRecord {
    ArrivalRecord {
        trip_id: trip_id.to_string(),
        predicted_ms: 0,
        scheduled_ms: at.timestamp_millis(),
        route_short_name: None,
    }
}
