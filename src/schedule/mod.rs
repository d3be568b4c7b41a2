// src/schedule/mod.rs

//! Schedule computation.
//!
//! - [`compute`] turns one reminder into its upcoming poll triggers.
//! - [`trigger`] defines [`PollTrigger`] and the [`AlarmKey`] it is armed under.
//!
//! Triggers only cover the seven days following the moment of computation,
//! so every reminder must be rescheduled at process start and whenever the
//! reminder set changes. After a recurring reminder has been polled,
//! [`compute_following`] re-arms the week that follows the fired occurrence.

pub mod compute;
pub mod trigger;

pub use compute::{
    DEFAULT_LOOKAHEAD_MINS, ScheduleComputer, ScheduleParams, compute_following, compute_triggers,
};
pub use trigger::{AlarmKey, PollTrigger};
