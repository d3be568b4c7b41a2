// src/reminder/mod.rs

//! Trip reminder data model.
//!
//! - [`model`] defines [`TripReminder`], its key and the weekday mask.
//! - [`validate`] holds the checks applied before a reminder is persisted.

pub mod model;
pub mod validate;

pub use model::{
    LEAD_MINUTE_CHOICES, MINUTES_PER_DAY, ReminderKey, RepeatDays, TripReminder,
    format_time_of_day, parse_time_of_day,
};
pub use validate::validate_reminder;
