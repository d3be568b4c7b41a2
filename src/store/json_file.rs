// src/store/json_file.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use tracing::{debug, info, warn};

use super::ReminderStore;
use crate::errors::{Result, TripwatchError};
use crate::reminder::{ReminderKey, TripReminder, validate_reminder};

/// Reminder store persisted as a JSON array.
///
/// The whole file is loaded at open time and kept in memory. Every mutation
/// writes the full set to `<path>.tmp` and renames it over `<path>`, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileReminderStore {
    path: PathBuf,
    reminders: Mutex<BTreeMap<ReminderKey, TripReminder>>,
}

impl JsonFileReminderStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// Rows that fail validation are dropped with a warning rather than
    /// failing the whole load.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reminders = if path.exists() {
            load_file(&path)?
        } else {
            debug!(path = ?path, "reminder store file does not exist yet; starting empty");
            BTreeMap::new()
        };

        info!(path = ?path, count = reminders.len(), "opened reminder store");

        Ok(Self {
            path,
            reminders: Mutex::new(reminders),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ReminderKey, TripReminder>> {
        self.reminders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Persist `next` and, only once that succeeded, make it current.
    fn commit(
        &self,
        current: &mut BTreeMap<ReminderKey, TripReminder>,
        next: BTreeMap<ReminderKey, TripReminder>,
    ) -> Result<()> {
        write_file(&self.path, &next)?;
        *current = next;
        Ok(())
    }
}

impl ReminderStore for JsonFileReminderStore {
    fn upsert(&self, reminder: TripReminder) -> Result<()> {
        validate_reminder(&reminder)?;
        let mut current = self.lock();
        let mut next = current.clone();
        debug!(reminder = %reminder.key(), "upserting reminder");
        next.insert(reminder.key(), reminder);
        self.commit(&mut current, next)
    }

    fn get(&self, key: &ReminderKey) -> Result<Option<TripReminder>> {
        Ok(self.lock().get(key).cloned())
    }

    fn list_all(&self) -> Result<Vec<TripReminder>> {
        Ok(self.lock().values().cloned().collect())
    }

    fn delete(&self, key: &ReminderKey) -> Result<bool> {
        let mut current = self.lock();
        if !current.contains_key(key) {
            return Ok(false);
        }
        let mut next = current.clone();
        next.remove(key);
        debug!(reminder = %key, "deleting reminder");
        self.commit(&mut current, next)?;
        Ok(true)
    }
}

fn load_file(path: &Path) -> Result<BTreeMap<ReminderKey, TripReminder>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading reminder store at {:?}", path))?;

    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let rows: Vec<TripReminder> = serde_json::from_str(&contents).map_err(|e| {
        TripwatchError::StoreError(format!("parsing reminder store at {:?}: {e}", path))
    })?;

    let mut reminders = BTreeMap::new();
    for row in rows {
        match validate_reminder(&row) {
            Ok(()) => {
                reminders.insert(row.key(), row);
            }
            Err(err) => {
                warn!(reminder = %row.key(), error = %err, "dropping invalid stored reminder");
            }
        }
    }
    Ok(reminders)
}

fn write_file(path: &Path, reminders: &BTreeMap<ReminderKey, TripReminder>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating dir {:?}", parent))?;
        }
    }

    let rows: Vec<&TripReminder> = reminders.values().collect();
    let json = serde_json::to_string_pretty(&rows)?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json).with_context(|| format!("writing {:?}", tmp_path))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replacing reminder store at {:?}", path))?;
    Ok(())
}
