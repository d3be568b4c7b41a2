// src/engine/mod.rs

//! Reminder engine.
//!
//! This module ties together:
//! - the schedule computation (which alarms to arm)
//! - the poll sessions started when an alarm fires
//! - the main event loop that reacts to:
//!   - reminders being saved or deleted
//!   - process restarts
//!   - alarms firing
//!   - the user dismissing a running reminder
//!   - shutdown signals
//!
//! The pure routing core lives in [`core`]; the three background operations
//! live in [`operations`]; the async/IO shell is [`runtime`].

use crate::reminder::ReminderKey;
use crate::schedule::PollTrigger;

/// Events flowing into the engine from the host, the CLI and the alarm
/// timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A reminder was created or updated.
    ReminderSaved(ReminderKey),
    /// A reminder was removed from the store.
    ReminderDeleted(ReminderKey),
    /// The host process (re)started; every reminder needs its alarms.
    Restarted,
    /// An armed alarm reached its instant.
    AlarmFired(PollTrigger),
    /// Stop the running poll session of one reminder, if any.
    CancelPoll(ReminderKey),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod operations;
pub mod runtime;

pub use core::{EngineCommand, EngineCore, EngineStep};
pub use operations::Operations;
pub use runtime::Engine;
