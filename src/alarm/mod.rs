// src/alarm/mod.rs

//! One-shot alarms that start poll sessions.
//!
//! [`AlarmTimer`] is keyed by [`AlarmKey`]: arming a key that is already
//! pending replaces it. [`TokioAlarmTimer`] is the in-process implementation
//! used by the daemon; when an alarm fires it sends
//! [`EngineEvent::AlarmFired`](crate::engine::EngineEvent::AlarmFired) back
//! into the engine.

use std::fmt::Debug;

use crate::reminder::ReminderKey;
use crate::schedule::{AlarmKey, PollTrigger};

pub mod tokio_timer;

pub use tokio_timer::TokioAlarmTimer;

pub trait AlarmTimer: Send + Sync + Debug {
    /// Arm `trigger` at `trigger.trigger_at` under `trigger.alarm_key()`,
    /// replacing any pending alarm with that key. The trigger is the payload
    /// delivered on fire.
    fn schedule_at(&self, trigger: PollTrigger);

    fn cancel(&self, key: &AlarmKey);

    /// Cancel every pending alarm of one reminder.
    fn cancel_reminder(&self, reminder: &ReminderKey);
}
