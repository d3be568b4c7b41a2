// src/lifecycle/manager.rs

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::errors::Result;
use crate::lifecycle::active_set::{ActiveTaskSet, TaskId};
use crate::lifecycle::keep_awake::KeepAwake;

/// Runs background operations as independent tokio tasks while keeping the
/// [`ActiveTaskSet`] (and with it the keep-awake resource) in sync.
#[derive(Debug, Clone)]
pub struct TaskLifecycleManager {
    active: Arc<ActiveTaskSet>,
}

impl TaskLifecycleManager {
    pub fn new(keep_awake: Arc<dyn KeepAwake>) -> Self {
        Self {
            active: Arc::new(ActiveTaskSet::new(keep_awake)),
        }
    }

    pub fn active(&self) -> &Arc<ActiveTaskSet> {
        &self.active
    }

    /// Start `operation` under `id`.
    ///
    /// The task is registered before it is spawned, so it counts as active
    /// from the moment this returns. Returns `None` (and drops `operation`)
    /// if a task with the same id is already running. Errors returned by the
    /// operation are logged; the task slot is released in every case.
    pub fn spawn<F>(&self, id: TaskId, operation: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let guard = self.active.begin(id)?;

        Some(tokio::spawn(async move {
            debug!(task = %guard.id(), "operation started");
            match operation.await {
                Ok(()) => debug!(task = %guard.id(), "operation finished"),
                Err(err) => error!(task = %guard.id(), error = %err, "operation failed"),
            }
            drop(guard);
        }))
    }

    /// Start the operation built by `make` under `id`, coalescing repeats.
    ///
    /// If `id` is already running, no new task is started; the running one
    /// builds and runs the operation once more when its current run ends,
    /// however many requests arrived meanwhile. Returns `None` in that case.
    pub fn spawn_coalesced<M, F>(&self, id: TaskId, make: M) -> Option<JoinHandle<()>>
    where
        M: Fn() -> F + Send + 'static,
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let mut guard = self.active.begin_or_rerun(id)?;

        Some(tokio::spawn(async move {
            loop {
                debug!(task = %guard.id(), "operation started");
                match make().await {
                    Ok(()) => debug!(task = %guard.id(), "operation finished"),
                    Err(err) => error!(task = %guard.id(), error = %err, "operation failed"),
                }
                if !guard.finish_or_rerun() {
                    break;
                }
                debug!(task = %guard.id(), "requested again while running; re-running");
            }
        }))
    }

    /// Resolve once every running operation has finished.
    pub async fn wait_idle(&self) {
        self.active.wait_idle().await;
    }
}
