// src/reminder/validate.rs

//! Record-store boundary checks.
//!
//! Nothing downstream of the store (schedule computation, polling) re-checks
//! these ranges, so every write path must go through [`validate_reminder`].

use crate::errors::{Result, TripwatchError};
use crate::reminder::model::{LEAD_MINUTE_CHOICES, MINUTES_PER_DAY, RepeatDays, TripReminder};

pub fn validate_reminder(reminder: &TripReminder) -> Result<()> {
    validate_ids(reminder)?;
    validate_departure(reminder)?;
    validate_lead(reminder)?;
    validate_repeat_days(reminder)?;
    Ok(())
}

fn validate_ids(reminder: &TripReminder) -> Result<()> {
    for (field, value) in [
        ("trip_id", &reminder.trip_id),
        ("stop_id", &reminder.stop_id),
        ("route_id", &reminder.route_id),
    ] {
        if value.trim().is_empty() {
            return Err(TripwatchError::InvalidReminder(format!(
                "{field} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_departure(reminder: &TripReminder) -> Result<()> {
    if reminder.departure_time_of_day >= MINUTES_PER_DAY {
        return Err(TripwatchError::InvalidReminder(format!(
            "departure_time_of_day must be in 0..={} (got {}) for {}",
            MINUTES_PER_DAY - 1,
            reminder.departure_time_of_day,
            reminder.key()
        )));
    }
    Ok(())
}

fn validate_lead(reminder: &TripReminder) -> Result<()> {
    if !LEAD_MINUTE_CHOICES.contains(&reminder.reminder_lead_minutes) {
        return Err(TripwatchError::InvalidReminder(format!(
            "reminder_lead_minutes must be one of {:?} (got {}) for {}",
            LEAD_MINUTE_CHOICES,
            reminder.reminder_lead_minutes,
            reminder.key()
        )));
    }
    Ok(())
}

fn validate_repeat_days(reminder: &TripReminder) -> Result<()> {
    let bits = reminder.repeat_days.bits();
    if bits & !RepeatDays::VALID_BITS != 0 {
        return Err(TripwatchError::InvalidReminder(format!(
            "repeat_days mask {bits:#04x} has bits outside the 7-day range for {}",
            reminder.key()
        )));
    }
    Ok(())
}
