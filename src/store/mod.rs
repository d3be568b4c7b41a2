// src/store/mod.rs

//! Durable keyed storage for trip reminders.
//!
//! The engine only talks to the [`ReminderStore`] trait. Two backends ship
//! with the crate:
//! - [`JsonFileReminderStore`]: a JSON file rewritten atomically on change.
//! - [`MemoryReminderStore`]: in-process map for tests and dry runs.
//!
//! Both validate on `upsert`, so a reminder with an out-of-range field can
//! never reach the schedule computation.

use std::fmt::Debug;

use crate::errors::Result;
use crate::reminder::{ReminderKey, TripReminder};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileReminderStore;
pub use memory::MemoryReminderStore;

/// Abstract reminder store.
pub trait ReminderStore: Send + Sync + Debug {
    /// Insert or fully replace the reminder with the same key.
    fn upsert(&self, reminder: TripReminder) -> Result<()>;

    fn get(&self, key: &ReminderKey) -> Result<Option<TripReminder>>;

    /// All reminders, ordered by key.
    fn list_all(&self) -> Result<Vec<TripReminder>>;

    /// Remove a reminder. Returns `false` if it did not exist.
    fn delete(&self, key: &ReminderKey) -> Result<bool>;
}
