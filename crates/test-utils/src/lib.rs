//! Shared fixtures for the `tripwatch` integration tests: reminder and
//! trigger builders, fake seams, and log capture.

pub mod builders;
pub mod fakes;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::fmt;
use tripwatch::logging::{LOG_ENV, filter_for, resolve_level};

static INIT: Once = Once::new();

/// Capture engine logs in the test harness.
///
/// Reads the same `TRIPWATCH_LOG` variable as the daemon, so
/// `TRIPWATCH_LOG=debug` shows alarm, poll and re-arm decisions. Output is
/// only printed for failing tests unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let level = resolve_level(None, env.as_deref());

        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter_for(level))
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Fail the test if `f` does not finish within `limit`.
///
/// Under `#[tokio::test(start_paused = true)]` the limit is virtual time:
/// it bounds how far the runtime may auto-advance.
pub async fn with_timeout<F, T>(limit: Duration, f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, f).await {
        Ok(value) => value,
        Err(_) => panic!("test did not finish within {limit:?}"),
    }
}
