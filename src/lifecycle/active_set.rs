// src/lifecycle/active_set.rs

//! Registry of in-flight background operations.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::lifecycle::keep_awake::KeepAwake;
use crate::reminder::ReminderKey;

/// Identity of a background operation.
///
/// Two requests with the same id are the same logical work; the second one
/// is not started while the first is active.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskId {
    ScheduleAll,
    ScheduleOne(ReminderKey),
    Poll(ReminderKey),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::ScheduleAll => f.write_str("schedule-all"),
            TaskId::ScheduleOne(key) => write!(f, "schedule-one:{key}"),
            TaskId::Poll(key) => write!(f, "poll:{key}"),
        }
    }
}

/// Set of active task ids that owns the keep-awake resource.
///
/// The resource is held exactly while the set is non-empty. The set, the
/// pending re-run requests and the resource transitions are guarded by one
/// mutex.
pub struct ActiveTaskSet {
    inner: Mutex<Inner>,
    keep_awake: Arc<dyn KeepAwake>,
    idle_tx: watch::Sender<bool>,
}

#[derive(Debug, Default)]
struct Inner {
    tasks: HashSet<TaskId>,
    /// Active tasks asked to run once more before they end.
    rerun: HashSet<TaskId>,
}

impl fmt::Debug for ActiveTaskSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveTaskSet")
            .field("inner", &*self.lock())
            .field("keep_awake", &self.keep_awake)
            .finish()
    }
}

impl ActiveTaskSet {
    pub fn new(keep_awake: Arc<dyn KeepAwake>) -> Self {
        let (idle_tx, _idle_rx) = watch::channel(true);
        Self {
            inner: Mutex::new(Inner::default()),
            keep_awake,
            idle_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register `id`. Acquires the keep-awake resource first if the set was
    /// empty.
    ///
    /// Returns `None` if a task with the same id is already active. The
    /// returned guard ends the task when dropped.
    pub fn begin(self: &Arc<Self>, id: TaskId) -> Option<TaskGuard> {
        let mut inner = self.lock();

        if inner.tasks.contains(&id) {
            warn!(task = %id, "task already running; not starting it again");
            return None;
        }
        Some(self.insert(&mut inner, id))
    }

    /// Like [`begin`](Self::begin), but when `id` is already active the
    /// running task is asked to run once more instead. Any number of such
    /// requests collapse into a single re-run.
    pub fn begin_or_rerun(self: &Arc<Self>, id: TaskId) -> Option<TaskGuard> {
        let mut inner = self.lock();

        if inner.tasks.contains(&id) {
            debug!(task = %id, "task already running; queued one more run");
            inner.rerun.insert(id);
            return None;
        }
        Some(self.insert(&mut inner, id))
    }

    fn insert(self: &Arc<Self>, inner: &mut Inner, id: TaskId) -> TaskGuard {
        if inner.tasks.is_empty() {
            self.keep_awake.acquire();
            self.idle_tx.send_replace(false);
        }
        inner.tasks.insert(id.clone());
        debug!(task = %id, active = inner.tasks.len(), "task begun");

        TaskGuard {
            set: Arc::clone(self),
            id,
            ended: false,
        }
    }

    /// Consume a pending re-run request for `id`, or end the task if there
    /// is none. Both happen under the set's lock, so a request arriving
    /// concurrently is either seen here or starts a fresh task.
    fn finish_or_rerun(&self, id: &TaskId) -> bool {
        let mut inner = self.lock();
        if inner.rerun.remove(id) {
            return true;
        }
        self.remove(&mut inner, id);
        false
    }

    /// Remove `id`. Releases the keep-awake resource if the set became empty.
    fn end(&self, id: &TaskId) {
        let mut inner = self.lock();
        inner.rerun.remove(id);
        self.remove(&mut inner, id);
    }

    fn remove(&self, inner: &mut Inner, id: &TaskId) {
        if !inner.tasks.remove(id) {
            warn!(task = %id, "ending a task that was not active");
            return;
        }
        debug!(task = %id, active = inner.tasks.len(), "task ended");

        if inner.tasks.is_empty() {
            self.keep_awake.release();
            self.idle_tx.send_replace(true);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.lock().tasks.contains(id)
    }

    /// Ids of the currently active tasks.
    pub fn snapshot(&self) -> Vec<TaskId> {
        self.lock().tasks.iter().cloned().collect()
    }

    /// Resolve once no task is active.
    pub async fn wait_idle(&self) {
        let mut idle_rx = self.idle_tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = idle_rx.wait_for(|idle| *idle).await;
    }
}

/// Scoped membership in an [`ActiveTaskSet`].
///
/// Dropping the guard ends the task, on every exit path of the owning
/// operation (including errors and panics).
pub struct TaskGuard {
    set: Arc<ActiveTaskSet>,
    id: TaskId,
    ended: bool,
}

impl TaskGuard {
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns `true` if the task was asked to run again while it ran; it
    /// then stays active. Otherwise the task ends here.
    pub fn finish_or_rerun(&mut self) -> bool {
        if self.ended {
            return false;
        }
        let rerun = self.set.finish_or_rerun(&self.id);
        self.ended = !rerun;
        rerun
    }
}

impl fmt::Debug for TaskGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGuard").field("id", &self.id).finish()
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if !self.ended {
            self.set.end(&self.id);
        }
    }
}
