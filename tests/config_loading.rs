// tests/config_loading.rs

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::Duration;
use chrono_tz::Tz;
use tempfile::tempdir;

use tripwatch::config::{ConfigFile, load_and_validate};
use tripwatch::errors::TripwatchError;
use tripwatch_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("Tripwatch.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn expect_config_error(contents: &str, needle: &str) {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), contents);

    match load_and_validate(&path) {
        Err(TripwatchError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}")
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn missing_file_yields_defaults() -> TestResult {
    let dir = tempdir()?;

    let cfg = load_and_validate(dir.path().join("absent.toml"))?;

    assert_eq!(cfg, ConfigFile::default());
    assert_eq!(cfg.engine.timezone, Tz::UTC);
    assert_eq!(cfg.engine.poll_interval_secs, 30);
    assert_eq!(cfg.notifications.default_title, "Tripwatch");
    Ok(())
}

#[test]
fn full_file_is_parsed() -> TestResult {
    let dir = tempdir()?;
    let path = write_config(
        dir.path(),
        r#"
[engine]
poll_interval_secs = 15
lookahead_mins = 5
found_grace_mins = 30
shutdown_grace_secs = 2
timezone = "America/Los_Angeles"

[store]
path = "/var/lib/tripwatch/reminders.json"

[arrivals]
base_url = "https://example.org/oba"
api_key = "secret"
timeout_secs = 3

[notifications]
default_title = "Bus"
"#,
    );

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.engine.timezone, chrono_tz::America::Los_Angeles);
    assert_eq!(cfg.store.path, Path::new("/var/lib/tripwatch/reminders.json"));
    assert_eq!(cfg.arrivals.api_key, "secret");
    assert_eq!(cfg.notifications.default_title, "Bus");

    let poll = cfg.poll_params();
    assert_eq!(poll.interval, StdDuration::from_secs(15));
    assert_eq!(poll.lookahead, Duration::minutes(5));
    assert_eq!(poll.found_grace, Duration::minutes(30));
    assert_eq!(cfg.schedule_params().lookahead, Duration::minutes(5));
    assert_eq!(cfg.shutdown_grace(), StdDuration::from_secs(2));
    Ok(())
}

#[test]
fn partial_file_keeps_other_defaults() -> TestResult {
    let dir = tempdir()?;
    let path = write_config(dir.path(), "[arrivals]\napi_key = \"abc\"\n");

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.arrivals.api_key, "abc");
    assert_eq!(cfg.arrivals.timeout_secs, 10);
    assert_eq!(cfg.engine.lookahead_mins, 10);
    Ok(())
}

#[test]
fn zero_poll_interval_is_rejected() {
    expect_config_error("[engine]\npoll_interval_secs = 0\n", "poll_interval_secs");
}

#[test]
fn zero_timeout_is_rejected() {
    expect_config_error("[arrivals]\ntimeout_secs = 0\n", "timeout_secs");
}

#[test]
fn empty_base_url_is_rejected() {
    expect_config_error("[arrivals]\nbase_url = \"  \"\n", "base_url");
}

#[test]
fn empty_store_path_is_rejected() {
    expect_config_error("[store]\npath = \"\"\n", "path");
}

#[test]
fn unknown_time_zone_is_rejected() {
    expect_config_error("[engine]\ntimezone = \"Mars/Olympus\"\n", "Mars/Olympus");
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let dir = tempdir()?;
    let path = write_config(dir.path(), "[engine\npoll_interval_secs = ");

    let err = load_and_validate(&path).expect_err("malformed toml");
    assert!(matches!(err, TripwatchError::TomlError(_)), "unexpected error: {err}");
    Ok(())
}

#[test]
fn builder_goes_through_validation() {
    let cfg = ConfigFileBuilder::new()
        .timezone("Europe/Oslo")
        .poll_interval_secs(5)
        .build();

    assert_eq!(cfg.engine.timezone, chrono_tz::Europe::Oslo);
    assert_eq!(cfg.schedule_computer().timezone(), chrono_tz::Europe::Oslo);
}
