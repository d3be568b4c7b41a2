// src/store/memory.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::ReminderStore;
use crate::errors::Result;
use crate::reminder::{ReminderKey, TripReminder, validate_reminder};

#[derive(Debug, Clone, Default)]
pub struct MemoryReminderStore {
    reminders: Arc<Mutex<BTreeMap<ReminderKey, TripReminder>>>,
}

impl MemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `reminders`, validating each.
    pub fn with_reminders(reminders: impl IntoIterator<Item = TripReminder>) -> Result<Self> {
        let store = Self::new();
        for reminder in reminders {
            store.upsert(reminder)?;
        }
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ReminderKey, TripReminder>> {
        self.reminders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ReminderStore for MemoryReminderStore {
    fn upsert(&self, reminder: TripReminder) -> Result<()> {
        validate_reminder(&reminder)?;
        self.lock().insert(reminder.key(), reminder);
        Ok(())
    }

    fn get(&self, key: &ReminderKey) -> Result<Option<TripReminder>> {
        Ok(self.lock().get(key).cloned())
    }

    fn list_all(&self) -> Result<Vec<TripReminder>> {
        Ok(self.lock().values().cloned().collect())
    }

    fn delete(&self, key: &ReminderKey) -> Result<bool> {
        Ok(self.lock().remove(key).is_some())
    }
}
