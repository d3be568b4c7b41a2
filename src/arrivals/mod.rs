// src/arrivals/mod.rs

//! Live arrival data.
//!
//! The poll loop queries an [`ArrivalSource`] for a stop and scans the
//! returned [`ArrivalRecord`]s for its trip. Production uses
//! [`ObaArrivalSource`]; tests script responses with a fake.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::errors::Result;

pub mod oba;

pub use oba::ObaArrivalSource;

/// One arrival at a stop. Times are epoch milliseconds, `0` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArrivalRecord {
    pub trip_id: String,
    pub predicted_ms: i64,
    pub scheduled_ms: i64,
    pub route_short_name: Option<String>,
}

impl ArrivalRecord {
    /// Predicted arrival when known, scheduled arrival otherwise.
    pub fn best_arrival_ms(&self) -> i64 {
        if self.predicted_ms != 0 {
            self.predicted_ms
        } else {
            self.scheduled_ms
        }
    }

    /// [`best_arrival_ms`](Self::best_arrival_ms) as an instant, `None` when
    /// neither time is set.
    pub fn best_arrival(&self) -> Option<DateTime<Utc>> {
        match self.best_arrival_ms() {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }
}

pub type ArrivalsFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<ArrivalRecord>>> + Send + 'a>>;

/// Query interface for arrival predictions at a stop.
///
/// Queries are read-only and may be retried freely. Errors are treated as
/// "no data this round" by the poll loop.
pub trait ArrivalSource: Send + Sync {
    fn query<'a>(&'a self, stop_id: &'a str) -> ArrivalsFuture<'a>;
}
