// src/engine/core.rs

//! Pure routing core.
//!
//! [`EngineCore::step`] turns one [`EngineEvent`] into the commands the async
//! shell (`engine::runtime::Engine`) should execute. It holds no channels and
//! performs no IO, so the routing table can be tested without Tokio.

use crate::engine::EngineEvent;
use crate::reminder::ReminderKey;
use crate::schedule::PollTrigger;

/// Command produced by the core, executed by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Cancel every pending alarm of one reminder.
    CancelAlarms(ReminderKey),
    /// Start the schedule-all operation.
    ScheduleAll,
    /// Start the schedule-one operation for a reminder.
    ScheduleOne(ReminderKey),
    /// Start a poll operation for a fired trigger.
    StartPoll(PollTrigger),
    /// Signal the running poll session of a reminder to stop.
    CancelPoll(ReminderKey),
    /// Stop accepting events and drain running operations.
    Shutdown,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStep {
    pub commands: Vec<EngineCommand>,
    /// Whether the shell's event loop should keep running.
    pub keep_running: bool,
}

impl EngineStep {
    fn run(commands: Vec<EngineCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct EngineCore {
    stopping: bool,
}

impl EngineCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// Route one event.
    ///
    /// Once shutdown has been requested, every later event is ignored.
    pub fn step(&mut self, event: EngineEvent) -> EngineStep {
        if self.stopping {
            return EngineStep {
                commands: Vec::new(),
                keep_running: false,
            };
        }

        match event {
            EngineEvent::ReminderSaved(key) => {
                EngineStep::run(vec![EngineCommand::ScheduleOne(key)])
            }
            EngineEvent::ReminderDeleted(key) => EngineStep::run(vec![
                EngineCommand::CancelAlarms(key),
                EngineCommand::ScheduleAll,
            ]),
            EngineEvent::Restarted => EngineStep::run(vec![EngineCommand::ScheduleAll]),
            EngineEvent::AlarmFired(trigger) => {
                EngineStep::run(vec![EngineCommand::StartPoll(trigger)])
            }
            EngineEvent::CancelPoll(key) => EngineStep::run(vec![EngineCommand::CancelPoll(key)]),
            EngineEvent::ShutdownRequested => {
                self.stopping = true;
                EngineStep {
                    commands: vec![EngineCommand::Shutdown],
                    keep_running: false,
                }
            }
        }
    }
}
