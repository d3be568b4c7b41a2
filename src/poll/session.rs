// src/poll/session.rs

//! Pure poll-session state machine.
//!
//! [`PollSession::observe`] consumes the result of one arrival query and the
//! current time, and decides whether to keep polling, notify, or give up.
//! It performs no IO; the async loop in [`super::runner`] feeds it.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::arrivals::ArrivalRecord;
use crate::reminder::{ReminderKey, TripReminder};
use crate::schedule::{DEFAULT_LOOKAHEAD_MINS, PollTrigger};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_FOUND_GRACE_MINS: i64 = 60;

/// Where the session stands with respect to its target trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// The trip has not appeared in any response yet.
    NotFound,
    /// The trip appeared but its notify instant has not arrived.
    Found,
    /// The notification has been emitted. Terminal.
    Notified,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Notified,
    /// Deadline passed without a due arrival; nothing was emitted.
    Abandoned,
    /// A stop signal arrived between attempts; nothing was emitted.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollParams {
    /// Delay between two arrival queries.
    pub interval: StdDuration,
    /// Margin past the scheduled departure before a never-found trip is
    /// abandoned.
    pub lookahead: Duration,
    /// Extra margin for trips that were found but never became due.
    pub found_grace: Duration,
}

impl Default for PollParams {
    fn default() -> Self {
        Self {
            interval: StdDuration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            lookahead: Duration::minutes(DEFAULT_LOOKAHEAD_MINS),
            found_grace: Duration::minutes(DEFAULT_FOUND_GRACE_MINS),
        }
    }
}

/// Decision taken after one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Sleep one interval and query again.
    Continue,
    /// Emit the notification for this arrival. Returned at most once.
    Notify {
        arrival: ArrivalRecord,
        arrival_at: DateTime<Utc>,
    },
    /// Stop without notifying.
    GiveUp,
    /// The session already notified; nothing more to do.
    Done,
}

#[derive(Debug, Clone)]
pub struct PollSession {
    key: ReminderKey,
    reminder_lead: Duration,
    departure_deadline: DateTime<Utc>,
    params: PollParams,
    state: PollState,
    attempts: u32,
}

impl PollSession {
    pub fn new(
        key: ReminderKey,
        reminder_lead: Duration,
        departure_deadline: DateTime<Utc>,
        params: PollParams,
    ) -> Self {
        Self {
            key,
            reminder_lead,
            departure_deadline,
            params,
            state: PollState::NotFound,
            attempts: 0,
        }
    }

    /// Session for the occurrence described by `trigger`.
    pub fn for_trigger(reminder: &TripReminder, trigger: &PollTrigger, params: PollParams) -> Self {
        Self::new(reminder.key(), reminder.lead(), trigger.departure_at, params)
    }

    pub fn key(&self) -> &ReminderKey {
        &self.key
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn departure_deadline(&self) -> DateTime<Utc> {
        self.departure_deadline
    }

    /// Instant after which the session gives up in its current state.
    pub fn give_up_at(&self) -> DateTime<Utc> {
        match self.state {
            PollState::NotFound | PollState::Notified => {
                self.departure_deadline + self.params.lookahead
            }
            PollState::Found => {
                self.departure_deadline + self.params.lookahead + self.params.found_grace
            }
        }
    }

    /// Feed one query round into the state machine.
    ///
    /// `arrivals` is `None` when the query failed; that round counts as
    /// "trip not seen" and leaves the state unchanged.
    pub fn observe(&mut self, arrivals: Option<&[ArrivalRecord]>, now: DateTime<Utc>) -> PollStep {
        if self.state == PollState::Notified {
            return PollStep::Done;
        }
        self.attempts += 1;

        if let Some(record) = arrivals
            .unwrap_or_default()
            .iter()
            .find(|a| a.trip_id == self.key.trip_id)
        {
            if self.state == PollState::NotFound {
                debug!(reminder = %self.key, attempt = self.attempts, "trip found in arrivals");
                self.state = PollState::Found;
            }

            if let Some(arrival_at) = record.best_arrival() {
                if arrival_at - self.reminder_lead < now {
                    self.state = PollState::Notified;
                    return PollStep::Notify {
                        arrival: record.clone(),
                        arrival_at,
                    };
                }
            }
        }

        if now > self.give_up_at() {
            debug!(
                reminder = %self.key,
                state = ?self.state,
                attempts = self.attempts,
                "poll deadline passed; giving up"
            );
            return PollStep::GiveUp;
        }

        PollStep::Continue
    }
}
