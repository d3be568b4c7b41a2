// src/poll/runner.rs

//! Async poll loop around [`PollSession`].

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::arrivals::ArrivalSource;
use crate::clock::Clock;
use crate::notify::{NotificationSink, notification_for};
use crate::poll::session::{PollOutcome, PollParams, PollSession, PollState, PollStep};
use crate::reminder::TripReminder;
use crate::schedule::PollTrigger;

/// Collaborators a poll session needs.
#[derive(Clone)]
pub struct PollContext {
    pub arrivals: Arc<dyn ArrivalSource>,
    pub sink: Arc<dyn NotificationSink>,
    pub clock: Arc<dyn Clock>,
    pub params: PollParams,
    /// Title used when a reminder has no display name.
    pub default_title: String,
}

impl fmt::Debug for PollContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollContext")
            .field("params", &self.params)
            .field("default_title", &self.default_title)
            .finish_non_exhaustive()
    }
}

/// Summary of a finished poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub outcome: PollOutcome,
    pub final_state: PollState,
    pub attempts: u32,
}

/// Poll arrivals for one reminder occurrence until it notifies, gives up, or
/// `cancel` fires.
///
/// The first query happens immediately; later ones are `params.interval`
/// apart. Query errors are logged and retried on the next round.
pub async fn run_poll_session(
    ctx: &PollContext,
    reminder: &TripReminder,
    trigger: &PollTrigger,
    cancel: &CancellationToken,
) -> PollReport {
    let mut session = PollSession::for_trigger(reminder, trigger, ctx.params);

    info!(
        reminder = %reminder.key(),
        departure_at = %trigger.departure_at,
        give_up_at = %session.give_up_at(),
        "poll session started"
    );

    loop {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return finish(&session, PollOutcome::Cancelled),
            response = ctx.arrivals.query(&reminder.stop_id) => response,
        };

        let now = ctx.clock.now();
        let step = match &response {
            Ok(arrivals) => session.observe(Some(arrivals.as_slice()), now),
            Err(err) => {
                warn!(
                    reminder = %reminder.key(),
                    attempt = session.attempts() + 1,
                    error = %err,
                    "arrival query failed; will retry"
                );
                session.observe(None, now)
            }
        };

        match step {
            PollStep::Continue => {}
            PollStep::Notify { arrival, arrival_at } => {
                let notification =
                    notification_for(reminder, &arrival, arrival_at, now, &ctx.default_title);
                info!(
                    reminder = %reminder.key(),
                    arrival_at = %arrival_at,
                    body = %notification.body,
                    "arrival due; notifying"
                );
                ctx.sink.notify(notification);
                return finish(&session, PollOutcome::Notified);
            }
            PollStep::Done => return finish(&session, PollOutcome::Notified),
            PollStep::GiveUp => return finish(&session, PollOutcome::Abandoned),
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return finish(&session, PollOutcome::Cancelled),
            _ = tokio::time::sleep(ctx.params.interval) => {}
        }
    }
}

fn finish(session: &PollSession, outcome: PollOutcome) -> PollReport {
    info!(
        reminder = %session.key(),
        ?outcome,
        state = ?session.state(),
        attempts = session.attempts(),
        "poll session finished"
    );
    PollReport {
        outcome,
        final_state: session.state(),
        attempts: session.attempts(),
    }
}
