// src/poll/mod.rs

//! Arrival polling for a fired trigger.
//!
//! The pure state machine lives in [`session`]; the async loop that queries
//! the arrival source, sleeps between rounds and honours cancellation is in
//! [`runner`].

pub mod runner;
pub mod session;

pub use runner::{PollContext, PollReport, run_poll_session};
pub use session::{
    DEFAULT_FOUND_GRACE_MINS, DEFAULT_POLL_INTERVAL_SECS, PollOutcome, PollParams, PollSession,
    PollState, PollStep,
};
