// src/schedule/compute.rs

//! Recurrence arithmetic: reminder + "now" → upcoming poll triggers.

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::reminder::TripReminder;
use crate::schedule::trigger::PollTrigger;

/// Default safety margin between the poll start and the reminder instant.
pub const DEFAULT_LOOKAHEAD_MINS: i64 = 10;

/// How far a nonexistent local time (DST gap) is pushed forward at most.
const MAX_GAP_MINS: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleParams {
    pub lookahead: Duration,
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            lookahead: Duration::minutes(DEFAULT_LOOKAHEAD_MINS),
        }
    }
}

/// Compute every future poll trigger for `reminder` as seen from `now`.
///
/// - One-time reminders (`repeat_days == 0`) look at today only.
/// - Recurring reminders look at today and the following six days, and
///   keep every day whose weekday bit is set.
///
/// A day is kept only if its reminder instant (departure minus lead) is
/// still in the future; missed days are skipped, never caught up. The
/// trigger itself fires `lookahead` before the reminder instant. Results are
/// sorted by trigger instant.
pub fn compute_triggers<T: TimeZone>(
    reminder: &TripReminder,
    now: &DateTime<T>,
    params: &ScheduleParams,
) -> Vec<PollTrigger> {
    let today = now.date_naive();
    let days = if reminder.repeat_days.is_one_time() {
        vec![today]
    } else {
        week_from(reminder, today)
    };

    triggers_on_days(reminder, &now.timezone(), days, now.with_timezone(&Utc), params)
}

/// Compute the triggers of a recurring reminder for the seven days after the
/// occurrence `fired` belongs to.
///
/// The window starts the day after the fired departure (in the time zone of
/// `now`), so the same weekday one week later is always included. Instants
/// that are not after `now` are skipped. One-time reminders yield nothing.
pub fn compute_following<T: TimeZone>(
    reminder: &TripReminder,
    fired: &PollTrigger,
    now: &DateTime<T>,
    params: &ScheduleParams,
) -> Vec<PollTrigger> {
    if reminder.repeat_days.is_one_time() {
        return Vec::new();
    }

    let tz = now.timezone();
    let fired_day = fired.departure_at.with_timezone(&tz).date_naive();
    let Some(first) = fired_day.checked_add_days(Days::new(1)) else {
        return Vec::new();
    };

    triggers_on_days(reminder, &tz, week_from(reminder, first), now.with_timezone(&Utc), params)
}

/// Days in `first..first + 7` whose weekday bit is set.
fn week_from(reminder: &TripReminder, first: NaiveDate) -> Vec<NaiveDate> {
    (0..7u64)
        .filter_map(|i| first.checked_add_days(Days::new(i)))
        .filter(|d| reminder.repeat_days.contains(d.weekday()))
        .collect()
}

fn triggers_on_days<T: TimeZone>(
    reminder: &TripReminder,
    tz: &T,
    days: Vec<NaiveDate>,
    now_utc: DateTime<Utc>,
    params: &ScheduleParams,
) -> Vec<PollTrigger> {
    let Some(departure_time) = reminder.departure_time() else {
        warn!(
            reminder = %reminder.key(),
            departure = reminder.departure_time_of_day,
            "reminder has an out-of-range departure time; skipping"
        );
        return Vec::new();
    };
    let lead = reminder.lead();

    let mut triggers = Vec::new();
    for day in days {
        let Some(departure_at) = resolve_local(tz, day.and_time(departure_time)) else {
            warn!(reminder = %reminder.key(), %day, "could not resolve local departure time");
            continue;
        };

        let remind_at = departure_at - lead;
        if remind_at <= now_utc {
            debug!(reminder = %reminder.key(), %day, "reminder instant already passed; skipping day");
            continue;
        }

        triggers.push(PollTrigger {
            key: reminder.key(),
            trigger_at: remind_at - params.lookahead,
            remind_at,
            departure_at,
        });
    }

    triggers.sort_by_key(|t| t.trigger_at);
    triggers
}

/// Map a local wall-clock time to an absolute instant.
///
/// Ambiguous times (DST overlap) take the earlier instant; nonexistent times
/// (DST gap) move forward to the first valid minute.
fn resolve_local<T: TimeZone>(tz: &T, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    for shift in 0..=MAX_GAP_MINS {
        let candidate = local + Duration::minutes(shift);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest.with_timezone(&Utc)),
            LocalResult::None => continue,
        }
    }
    None
}

/// The schedule computation bound to the engine's time zone and parameters.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleComputer {
    tz: Tz,
    params: ScheduleParams,
}

impl ScheduleComputer {
    pub fn new(tz: Tz, params: ScheduleParams) -> Self {
        Self { tz, params }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn params(&self) -> &ScheduleParams {
        &self.params
    }

    pub fn compute(&self, reminder: &TripReminder, now: DateTime<Utc>) -> Vec<PollTrigger> {
        compute_triggers(reminder, &now.with_timezone(&self.tz), &self.params)
    }

    /// See [`compute_following`].
    pub fn compute_following(
        &self,
        reminder: &TripReminder,
        fired: &PollTrigger,
        now: DateTime<Utc>,
    ) -> Vec<PollTrigger> {
        compute_following(reminder, fired, &now.with_timezone(&self.tz), &self.params)
    }
}
