// src/schedule/trigger.rs

use std::fmt;

use chrono::{DateTime, Utc};

use crate::reminder::ReminderKey;

/// The instant at which polling for one reminder occurrence should begin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTrigger {
    pub key: ReminderKey,
    /// When the alarm should fire and the poll session start.
    pub trigger_at: DateTime<Utc>,
    /// Scheduled departure minus the reminder lead.
    pub remind_at: DateTime<Utc>,
    /// Scheduled departure for this occurrence; the poll session's deadline.
    pub departure_at: DateTime<Utc>,
}

impl PollTrigger {
    /// Alarm key for this trigger.
    pub fn alarm_key(&self) -> AlarmKey {
        AlarmKey {
            reminder: self.key.clone(),
            slot: self.trigger_at,
        }
    }
}

/// Key under which a trigger is armed.
///
/// A recurring reminder arms one trigger per qualifying day, so the key is
/// the reminder plus the trigger instant. Re-arming the same slot replaces
/// the pending alarm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlarmKey {
    pub reminder: ReminderKey,
    pub slot: DateTime<Utc>,
}

impl fmt::Display for AlarmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.reminder, self.slot.timestamp())
    }
}
