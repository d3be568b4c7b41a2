// src/engine/runtime.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::lifecycle::{TaskId, TaskLifecycleManager};
use crate::reminder::ReminderKey;
use crate::schedule::PollTrigger;

use super::core::EngineCore;
use super::operations::Operations;
use super::{EngineCommand, EngineEvent};

type PollTokens = Arc<Mutex<HashMap<ReminderKey, CancellationToken>>>;

/// Drives the engine in response to [`EngineEvent`]s.
///
/// This is the IO shell around [`EngineCore`]: it reads events from the
/// channel, asks the core what to do, and starts operations as lifecycle
/// tasks.
#[derive(Debug)]
pub struct Engine {
    core: EngineCore,
    event_rx: mpsc::Receiver<EngineEvent>,
    ops: Operations,
    lifecycle: TaskLifecycleManager,
    shutdown: CancellationToken,
    polls: PollTokens,
    shutdown_grace: Duration,
}

impl Engine {
    pub fn new(
        event_rx: mpsc::Receiver<EngineEvent>,
        ops: Operations,
        lifecycle: TaskLifecycleManager,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            core: EngineCore::new(),
            event_rx,
            ops,
            lifecycle,
            shutdown: CancellationToken::new(),
            polls: Arc::new(Mutex::new(HashMap::new())),
            shutdown_grace,
        }
    }

    pub fn lifecycle(&self) -> &TaskLifecycleManager {
        &self.lifecycle
    }

    /// Engine-wide stop signal; every poll session's token is a child.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Main event loop.
    ///
    /// Runs until the core asks to stop or the channel closes, then cancels
    /// every running poll session and waits up to the shutdown grace period
    /// for running operations to drain.
    pub async fn run(mut self) -> Result<()> {
        info!("tripwatch engine started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("engine event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "engine received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("core requested exit; stopping engine");
                break;
            }
        }

        self.drain().await;
        info!("engine exiting");
        Ok(())
    }

    fn execute_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::CancelAlarms(key) => {
                self.ops.alarms().cancel_reminder(&key);
            }
            EngineCommand::ScheduleAll => {
                let ops = self.ops.clone();
                self.lifecycle.spawn_coalesced(TaskId::ScheduleAll, move || {
                    let ops = ops.clone();
                    async move { ops.schedule_all().await.map(|_| ()) }
                });
            }
            EngineCommand::ScheduleOne(key) => {
                let ops = self.ops.clone();
                let id = TaskId::ScheduleOne(key.clone());
                self.lifecycle.spawn_coalesced(id, move || {
                    let ops = ops.clone();
                    let key = key.clone();
                    async move { ops.schedule_one(&key).await.map(|_| ()) }
                });
            }
            EngineCommand::StartPoll(trigger) => self.start_poll(trigger),
            EngineCommand::CancelPoll(key) => match lock_polls(&self.polls).get(&key) {
                Some(token) => {
                    info!(reminder = %key, "cancelling poll session");
                    token.cancel();
                }
                None => debug!(reminder = %key, "no poll session running; nothing to cancel"),
            },
            EngineCommand::Shutdown => {
                info!("shutdown requested");
            }
        }
    }

    fn start_poll(&self, trigger: PollTrigger) {
        let key = trigger.key.clone();

        let cancel = {
            let mut polls = lock_polls(&self.polls);
            if polls.contains_key(&key) {
                warn!(reminder = %key, "poll already running for reminder; ignoring alarm");
                return;
            }
            let token = self.shutdown.child_token();
            polls.insert(key.clone(), token.clone());
            token
        };

        let ops = self.ops.clone();
        let shutdown = self.shutdown.clone();
        let slot = PollSlot {
            polls: Arc::clone(&self.polls),
            key: key.clone(),
        };

        // `slot` moves into the task, so the token is removed when the task
        // ends (also on panic) or right away if the task is not started.
        self.lifecycle.spawn(TaskId::Poll(key), async move {
            let _slot = slot;
            ops.poll_one(&trigger, &cancel, &shutdown).await.map(|_| ())
        });
    }

    async fn drain(&self) {
        self.shutdown.cancel();

        let active = self.lifecycle.active().len();
        if active == 0 {
            return;
        }

        info!(active, grace_secs = self.shutdown_grace.as_secs(), "waiting for running operations");
        if tokio::time::timeout(self.shutdown_grace, self.lifecycle.wait_idle())
            .await
            .is_err()
        {
            let left: Vec<String> = self
                .lifecycle
                .active()
                .snapshot()
                .iter()
                .map(ToString::to_string)
                .collect();
            warn!(?left, "shutdown grace elapsed with operations still running");
        }
    }
}

/// A running poll's entry in the token map, removed on drop.
struct PollSlot {
    polls: PollTokens,
    key: ReminderKey,
}

impl Drop for PollSlot {
    fn drop(&mut self) {
        lock_polls(&self.polls).remove(&self.key);
    }
}

fn lock_polls(
    polls: &Mutex<HashMap<ReminderKey, CancellationToken>>,
) -> MutexGuard<'_, HashMap<ReminderKey, CancellationToken>> {
    polls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
