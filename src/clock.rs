// src/clock.rs

//! Wall-clock abstraction.
//!
//! Recurrence math and the poll loop both ask a [`Clock`] for "now" instead
//! of calling `Utc::now()` directly, so tests can drive time explicitly.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// Source of the current wall-clock instant.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
