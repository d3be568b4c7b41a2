// src/lifecycle/mod.rs

//! Background task lifecycle.
//!
//! - [`active_set`] tracks which operations are in flight and owns the
//!   keep-awake resource; [`TaskGuard`] ends a task when dropped.
//! - [`keep_awake`] is the injected keep-awake seam.
//! - [`manager`] spawns operations with a guard attached, optionally
//!   coalescing repeated requests into one re-run.

pub mod active_set;
pub mod keep_awake;
pub mod manager;

pub use active_set::{ActiveTaskSet, TaskGuard, TaskId};
pub use keep_awake::{KeepAwake, LogKeepAwake};
pub use manager::TaskLifecycleManager;
