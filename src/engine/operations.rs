// src/engine/operations.rs

//! The three background operations: schedule-all, schedule-one and poll.
//!
//! Each runs as its own task under the
//! [`TaskLifecycleManager`](crate::lifecycle::TaskLifecycleManager); this
//! module only holds their bodies.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::alarm::AlarmTimer;
use crate::clock::Clock;
use crate::errors::Result;
use crate::poll::{PollContext, PollOutcome, PollReport, run_poll_session};
use crate::reminder::{ReminderKey, TripReminder};
use crate::schedule::{PollTrigger, ScheduleComputer};
use crate::store::ReminderStore;

/// Shared collaborators of every operation. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Operations {
    store: Arc<dyn ReminderStore>,
    alarms: Arc<dyn AlarmTimer>,
    computer: ScheduleComputer,
    poll: PollContext,
}

impl Operations {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        alarms: Arc<dyn AlarmTimer>,
        computer: ScheduleComputer,
        poll: PollContext,
    ) -> Self {
        Self {
            store,
            alarms,
            computer,
            poll,
        }
    }

    pub fn store(&self) -> &Arc<dyn ReminderStore> {
        &self.store
    }

    pub fn alarms(&self) -> &Arc<dyn AlarmTimer> {
        &self.alarms
    }

    fn clock(&self) -> &Arc<dyn Clock> {
        &self.poll.clock
    }

    /// Arm the triggers of every stored reminder. Returns how many alarms
    /// were armed.
    pub async fn schedule_all(&self) -> Result<usize> {
        let reminders = self.store.list_all()?;
        let now = self.clock().now();

        let armed: usize = reminders
            .iter()
            .map(|reminder| self.arm(self.computer.compute(reminder, now)))
            .sum();

        info!(reminders = reminders.len(), armed, "scheduled all reminders");
        Ok(armed)
    }

    /// Re-arm one reminder from scratch: its pending alarms are cancelled
    /// first, then its current triggers are armed. A reminder that is no
    /// longer stored ends the operation without effect.
    pub async fn schedule_one(&self, key: &ReminderKey) -> Result<usize> {
        self.alarms.cancel_reminder(key);

        let Some(reminder) = self.store.get(key)? else {
            debug!(reminder = %key, "reminder not stored; nothing to schedule");
            return Ok(0);
        };

        let armed = self.arm(self.computer.compute(&reminder, self.clock().now()));
        info!(reminder = %key, armed, "scheduled reminder");
        Ok(armed)
    }

    /// Run the poll session for a fired trigger, then prune or re-arm the
    /// reminder.
    ///
    /// `cancel` stops just this session; `shutdown` is the engine-wide token.
    /// After a shutdown the reminder is left untouched so the next start
    /// schedules it again. Returns `None` if the reminder was deleted before
    /// the alarm fired.
    pub async fn poll_one(
        &self,
        trigger: &PollTrigger,
        cancel: &CancellationToken,
        shutdown: &CancellationToken,
    ) -> Result<Option<PollReport>> {
        let Some(reminder) = self.store.get(&trigger.key)? else {
            info!(reminder = %trigger.key, "reminder deleted before its alarm fired; skipping poll");
            return Ok(None);
        };

        let report = run_poll_session(&self.poll, &reminder, trigger, cancel).await;

        if report.outcome == PollOutcome::Cancelled && shutdown.is_cancelled() {
            debug!(reminder = %trigger.key, "shutting down; leaving reminder as is");
            return Ok(Some(report));
        }

        self.after_poll(&reminder, trigger)?;
        Ok(Some(report))
    }

    /// Prune a finished one-time reminder, or arm the week that follows the
    /// fired occurrence of a recurring one.
    fn after_poll(&self, polled: &TripReminder, fired: &PollTrigger) -> Result<()> {
        let key = polled.key();

        // The reminder may have been edited or removed while polling.
        let Some(current) = self.store.get(&key)? else {
            return Ok(());
        };

        if current.is_recurring() {
            let following: Vec<PollTrigger> = self
                .computer
                .compute_following(&current, fired, self.clock().now())
                .into_iter()
                .filter(|t| t.trigger_at > fired.trigger_at)
                .collect();
            let armed = self.arm(following);
            debug!(reminder = %key, armed, "re-armed recurring reminder");
        } else if &current == polled {
            if self.store.delete(&key)? {
                info!(reminder = %key, "one-time reminder done; removed");
            }
        } else {
            warn!(reminder = %key, "one-time reminder changed while polling; keeping it");
        }
        Ok(())
    }

    fn arm(&self, triggers: Vec<PollTrigger>) -> usize {
        let mut armed = 0;
        for trigger in triggers {
            debug!(
                reminder = %trigger.key,
                trigger_at = %trigger.trigger_at,
                departure_at = %trigger.departure_at,
                "arming alarm"
            );
            self.alarms.schedule_at(trigger);
            armed += 1;
        }
        armed
    }
}
