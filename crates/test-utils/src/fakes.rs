//! In-memory stand-ins for the engine's external seams.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::debug;
use tripwatch::alarm::AlarmTimer;
use tripwatch::arrivals::{ArrivalRecord, ArrivalSource, ArrivalsFuture};
use tripwatch::clock::Clock;
use tripwatch::errors::TripwatchError;
use tripwatch::lifecycle::KeepAwake;
use tripwatch::notify::{Notification, NotificationSink};
use tripwatch::reminder::ReminderKey;
use tripwatch::schedule::{AlarmKey, PollTrigger};

/// One scripted answer of a [`ScriptedArrivalSource`].
#[derive(Debug, Clone)]
pub enum Scripted {
    Arrivals(Vec<ArrivalRecord>),
    Error(String),
}

/// Arrival source that replays a fixed list of responses, one per query.
///
/// Once the script is used up every further query returns an empty list.
#[derive(Debug, Clone, Default)]
pub struct ScriptedArrivalSource {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedArrivalSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_arrivals(self, arrivals: Vec<ArrivalRecord>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Arrivals(arrivals));
        self
    }

    pub fn then_error(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Error(message.to_string()));
        self
    }

    /// Queue the same response `times` times.
    pub fn repeat_arrivals(self, arrivals: Vec<ArrivalRecord>, times: usize) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            for _ in 0..times {
                script.push_back(Scripted::Arrivals(arrivals.clone()));
            }
        }
        self
    }

    /// Stop ids queried so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl ArrivalSource for ScriptedArrivalSource {
    fn query<'a>(&'a self, stop_id: &'a str) -> ArrivalsFuture<'a> {
        Box::pin(async move {
            self.queries.lock().unwrap().push(stop_id.to_string());
            let next = self.script.lock().unwrap().pop_front();
            debug!(stop_id, ?next, "scripted arrival query");
            match next {
                Some(Scripted::Arrivals(arrivals)) => Ok(arrivals),
                Some(Scripted::Error(message)) => Err(TripwatchError::ArrivalsError(message)),
                None => Ok(Vec::new()),
            }
        })
    }
}

/// Notification sink that keeps every notification.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationSink {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

/// Alarm timer that never fires; it only records what is armed.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlarmTimer {
    pending: Arc<Mutex<BTreeMap<AlarmKey, PollTrigger>>>,
    history: Arc<Mutex<Vec<PollTrigger>>>,
    cancelled_reminders: Arc<Mutex<Vec<ReminderKey>>>,
}

impl RecordingAlarmTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently armed triggers, ordered by key.
    pub fn pending(&self) -> Vec<PollTrigger> {
        self.pending.lock().unwrap().values().cloned().collect()
    }

    pub fn pending_for(&self, reminder: &ReminderKey) -> Vec<PollTrigger> {
        self.pending
            .lock()
            .unwrap()
            .values()
            .filter(|t| &t.key == reminder)
            .cloned()
            .collect()
    }

    /// Every `schedule_at` call, in order.
    pub fn history(&self) -> Vec<PollTrigger> {
        self.history.lock().unwrap().clone()
    }

    pub fn cancelled_reminders(&self) -> Vec<ReminderKey> {
        self.cancelled_reminders.lock().unwrap().clone()
    }
}

impl AlarmTimer for RecordingAlarmTimer {
    fn schedule_at(&self, trigger: PollTrigger) {
        self.history.lock().unwrap().push(trigger.clone());
        self.pending
            .lock()
            .unwrap()
            .insert(trigger.alarm_key(), trigger);
    }

    fn cancel(&self, key: &AlarmKey) {
        self.pending.lock().unwrap().remove(key);
    }

    fn cancel_reminder(&self, reminder: &ReminderKey) {
        self.cancelled_reminders
            .lock()
            .unwrap()
            .push(reminder.clone());
        self.pending
            .lock()
            .unwrap()
            .retain(|key, _| &key.reminder != reminder);
    }
}

/// Keep-awake resource that counts transitions and flags misuse.
#[derive(Debug, Default)]
pub struct CountingKeepAwake {
    held: AtomicBool,
    acquires: AtomicUsize,
    releases: AtomicUsize,
    violations: AtomicUsize,
}

impl CountingKeepAwake {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Acquires while held plus releases while not held.
    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }
}

impl KeepAwake for CountingKeepAwake {
    fn acquire(&self) {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        if self.held.swap(true, Ordering::SeqCst) {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if !self.held.swap(false, Ordering::SeqCst) {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Wall clock that follows tokio's clock from a fixed starting instant.
///
/// With `#[tokio::test(start_paused = true)]`, sleeping or
/// `tokio::time::advance` moves this clock by exactly the same amount.
#[derive(Debug, Clone, Copy)]
pub struct PausedClock {
    base: DateTime<Utc>,
    started: tokio::time::Instant,
}

impl PausedClock {
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now() - self.started;
        self.base + chrono::Duration::from_std(elapsed).unwrap_or(chrono::Duration::zero())
    }
}

/// Clock that returns whatever it was last set to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
