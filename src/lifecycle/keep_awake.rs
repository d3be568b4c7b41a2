// src/lifecycle/keep_awake.rs

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

/// Exclusive resource that keeps the host from suspending while background
/// work is outstanding.
///
/// Only [`ActiveTaskSet`](super::ActiveTaskSet) calls these, always under its
/// lock, so implementations see strictly alternating acquire/release calls.
pub trait KeepAwake: Send + Sync + Debug {
    fn acquire(&self);
    fn release(&self);
}

/// Keep-awake used by the daemon: the process stays alive on its own, so
/// this only records the transitions.
#[derive(Debug, Default)]
pub struct LogKeepAwake {
    held: AtomicBool,
}

impl LogKeepAwake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

impl KeepAwake for LogKeepAwake {
    fn acquire(&self) {
        if self.held.swap(true, Ordering::SeqCst) {
            warn!("keep-awake acquired while already held");
        }
        debug!("keep-awake acquired");
    }

    fn release(&self) {
        if !self.held.swap(false, Ordering::SeqCst) {
            warn!("keep-awake released while not held");
        }
        debug!("keep-awake released");
    }
}
