// src/reminder/model.rs

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Lead times (in minutes) a reminder may be configured with.
pub const LEAD_MINUTE_CHOICES: [u32; 9] = [0, 1, 3, 5, 10, 15, 20, 25, 30];

/// Number of minutes in a day; `departure_time_of_day` must be below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Identity of a reminder: one trip at one stop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReminderKey {
    pub trip_id: String,
    pub stop_id: String,
}

impl ReminderKey {
    pub fn new(trip_id: impl Into<String>, stop_id: impl Into<String>) -> Self {
        Self {
            trip_id: trip_id.into(),
            stop_id: stop_id.into(),
        }
    }
}

impl fmt::Display for ReminderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trip_id, self.stop_id)
    }
}

/// Weekday mask: bit `i` is weekday `i`, counting from Sunday = 0.
///
/// An empty mask marks a one-time reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepeatDays(u8);

impl RepeatDays {
    /// One-time reminder.
    pub const ONCE: RepeatDays = RepeatDays(0);

    /// Every bit a valid mask may carry.
    pub const VALID_BITS: u8 = 0x7F;

    /// Wrap a raw mask. Range checking happens when a reminder is stored.
    pub fn from_bits(bits: u8) -> Self {
        RepeatDays(bits)
    }

    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(RepeatDays::ONCE, RepeatDays::with)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_one_time(self) -> bool {
        self.0 == 0
    }

    pub fn with(self, day: Weekday) -> Self {
        RepeatDays(self.0 | day_bit(day))
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & day_bit(day) != 0
    }

    /// Set weekdays, Sunday first.
    pub fn days(self) -> impl Iterator<Item = Weekday> {
        WEEK_FROM_SUNDAY
            .into_iter()
            .filter(move |day| self.contains(*day))
    }
}

const WEEK_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

fn day_bit(day: Weekday) -> u8 {
    1 << day.num_days_from_sunday()
}

impl fmt::Display for RepeatDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one_time() {
            return f.write_str("once");
        }
        let names: Vec<String> = self.days().map(|d| d.to_string()).collect();
        f.write_str(&names.join(","))
    }
}

/// Parses `once`, `daily`, `weekdays`, `weekends`, or a comma separated list
/// of day names such as `mon,wed,fri`.
impl FromStr for RepeatDays {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "once" => return Ok(RepeatDays::ONCE),
            "daily" => return Ok(RepeatDays(RepeatDays::VALID_BITS)),
            "weekdays" => {
                return Ok(RepeatDays::from_days([
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                ]));
            }
            "weekends" => return Ok(RepeatDays::from_days([Weekday::Sat, Weekday::Sun])),
            _ => {}
        }

        let mut days = RepeatDays::ONCE;
        for part in s.split(',') {
            let day = part
                .trim()
                .parse::<Weekday>()
                .map_err(|_| format!("invalid weekday '{}' in repeat days", part.trim()))?;
            days = days.with(day);
        }
        Ok(days)
    }
}

/// A user-configured reminder for one trip at one stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripReminder {
    pub trip_id: String,
    pub stop_id: String,
    pub route_id: String,
    #[serde(default)]
    pub headsign: String,
    #[serde(default)]
    pub display_name: String,
    /// Scheduled departure, minutes since local midnight.
    pub departure_time_of_day: u16,
    /// Minutes before the predicted departure at which to notify.
    pub reminder_lead_minutes: u32,
    #[serde(default)]
    pub repeat_days: RepeatDays,
}

impl TripReminder {
    pub fn key(&self) -> ReminderKey {
        ReminderKey::new(self.trip_id.clone(), self.stop_id.clone())
    }

    pub fn lead(&self) -> Duration {
        Duration::minutes(i64::from(self.reminder_lead_minutes))
    }

    pub fn is_recurring(&self) -> bool {
        !self.repeat_days.is_one_time()
    }

    /// Departure as a wall-clock time, or `None` if the stored value is out
    /// of range.
    pub fn departure_time(&self) -> Option<NaiveTime> {
        let mins = u32::from(self.departure_time_of_day);
        NaiveTime::from_hms_opt(mins / 60, mins % 60, 0)
    }
}

/// Parse `HH:MM` into minutes since midnight.
pub fn parse_time_of_day(s: &str) -> Result<u16, String> {
    let time = NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| format!("invalid departure time '{s}' (expected HH:MM): {e}"))?;
    Ok((time.hour() * 60 + time.minute()) as u16)
}

/// Format minutes since midnight as `HH:MM`.
pub fn format_time_of_day(mins: u16) -> String {
    format!("{:02}:{:02}", mins / 60, mins % 60)
}
