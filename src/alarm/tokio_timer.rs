// src/alarm/tokio_timer.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::AlarmTimer;
use crate::clock::Clock;
use crate::engine::EngineEvent;
use crate::reminder::ReminderKey;
use crate::schedule::{AlarmKey, PollTrigger};

/// A pending alarm: the sleeping task plus a generation number so a fired
/// alarm only removes its own entry, never a replacement.
#[derive(Debug)]
struct PendingAlarm {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct AlarmTable {
    next_generation: u64,
    pending: HashMap<AlarmKey, PendingAlarm>,
}

/// Alarm timer backed by one `tokio::time::sleep` task per key.
#[derive(Debug, Clone)]
pub struct TokioAlarmTimer {
    events: mpsc::Sender<EngineEvent>,
    clock: Arc<dyn Clock>,
    table: Arc<Mutex<AlarmTable>>,
}

impl TokioAlarmTimer {
    pub fn new(events: mpsc::Sender<EngineEvent>, clock: Arc<dyn Clock>) -> Self {
        Self {
            events,
            clock,
            table: Arc::new(Mutex::new(AlarmTable::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AlarmTable> {
        lock_table(&self.table)
    }

    /// Keys of alarms that have not fired yet.
    pub fn pending_keys(&self) -> Vec<AlarmKey> {
        let mut keys: Vec<AlarmKey> = self.lock().pending.keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn lock_table(table: &Mutex<AlarmTable>) -> MutexGuard<'_, AlarmTable> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AlarmTimer for TokioAlarmTimer {
    fn schedule_at(&self, trigger: PollTrigger) {
        let key = trigger.alarm_key();
        let delay = (trigger.trigger_at - self.clock.now())
            .to_std()
            .unwrap_or_default();

        // Hold the table lock across the spawn so the alarm task cannot
        // look up its entry before it is inserted.
        let mut table = self.lock();
        table.next_generation += 1;
        let generation = table.next_generation;

        let events = self.events.clone();
        let shared = Arc::clone(&self.table);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut table = lock_table(&shared);
                match table.pending.get(&task_key) {
                    Some(entry) if entry.generation == generation => {
                        table.pending.remove(&task_key);
                    }
                    _ => return,
                }
            }

            info!(alarm = %task_key, "alarm fired");
            if events.send(EngineEvent::AlarmFired(trigger)).await.is_err() {
                warn!(alarm = %task_key, "engine channel closed; dropping fired alarm");
            }
        });

        debug!(alarm = %key, delay_secs = delay.as_secs(), "alarm armed");
        if let Some(previous) = table
            .pending
            .insert(key, PendingAlarm { generation, handle })
        {
            previous.handle.abort();
        }
    }

    fn cancel(&self, key: &AlarmKey) {
        if let Some(entry) = self.lock().pending.remove(key) {
            entry.handle.abort();
            debug!(alarm = %key, "alarm cancelled");
        }
    }

    fn cancel_reminder(&self, reminder: &ReminderKey) {
        let mut table = self.lock();
        let keys: Vec<AlarmKey> = table
            .pending
            .keys()
            .filter(|k| &k.reminder == reminder)
            .cloned()
            .collect();

        for key in keys {
            if let Some(entry) = table.pending.remove(&key) {
                entry.handle.abort();
            }
        }
        debug!(%reminder, "cancelled pending alarms for reminder");
    }
}
