// tests/store_validation.rs

use std::error::Error;
use std::fs;

use chrono::Weekday;
use tempfile::tempdir;

use tripwatch::errors::TripwatchError;
use tripwatch::reminder::{ReminderKey, RepeatDays, TripReminder};
use tripwatch::store::{JsonFileReminderStore, MemoryReminderStore, ReminderStore};
use tripwatch_test_utils::builders::TripReminderBuilder;
use tripwatch_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn valid() -> TripReminder {
    TripReminderBuilder::new("trip-1", "stop-1")
        .route("R44")
        .departs("08:00")
        .lead(10)
        .on(&[Weekday::Mon, Weekday::Fri])
        .build()
}

fn assert_rejected(reminder: TripReminder) {
    let store = MemoryReminderStore::new();
    let err = store.upsert(reminder).expect_err("invalid reminder must be rejected");
    assert!(
        matches!(err, TripwatchError::InvalidReminder(_)),
        "unexpected error: {err}"
    );
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn empty_identifiers_are_rejected() {
    let mut r = valid();
    r.trip_id = String::new();
    assert_rejected(r);

    let mut r = valid();
    r.stop_id = "  ".to_string();
    assert_rejected(r);

    let mut r = valid();
    r.route_id = String::new();
    assert_rejected(r);
}

#[test]
fn departure_past_end_of_day_is_rejected() {
    let mut r = valid();
    r.departure_time_of_day = 1440;
    assert_rejected(r);
}

#[test]
fn lead_outside_the_allowed_choices_is_rejected() {
    for lead in [2, 7, 31, 60] {
        let mut r = valid();
        r.reminder_lead_minutes = lead;
        assert_rejected(r);
    }
}

#[test]
fn repeat_mask_with_an_eighth_bit_is_rejected() {
    let mut r = valid();
    r.repeat_days = RepeatDays::from_bits(0x80 | 0x02);
    assert_rejected(r);
}

#[test]
fn boundary_values_are_accepted() {
    let store = MemoryReminderStore::new();
    let mut r = valid();
    r.departure_time_of_day = 1439;
    r.reminder_lead_minutes = 0;
    r.repeat_days = RepeatDays::from_bits(RepeatDays::VALID_BITS);

    store.upsert(r.clone()).unwrap();

    assert_eq!(store.get(&r.key()).unwrap(), Some(r));
}

#[test]
fn upsert_replaces_every_field_of_the_same_key() {
    let store = MemoryReminderStore::new();
    store.upsert(valid()).unwrap();

    let replacement = TripReminderBuilder::new("trip-1", "stop-1")
        .route("R7")
        .departs("17:15")
        .lead(5)
        .build();
    store.upsert(replacement.clone()).unwrap();

    let all = store.list_all().unwrap();
    assert_eq!(all, vec![replacement]);
}

#[test]
fn json_store_round_trips_through_reopen() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("reminders.json");

    {
        let store = JsonFileReminderStore::open(&path)?;
        store.upsert(valid())?;
        store.upsert(TripReminderBuilder::new("trip-2", "stop-9").build())?;
    }
    assert!(!path.with_extension("tmp").exists());

    let reopened = JsonFileReminderStore::open(&path)?;
    let keys: Vec<ReminderKey> = reopened.list_all()?.iter().map(|r| r.key()).collect();
    assert_eq!(
        keys,
        vec![
            ReminderKey::new("trip-1", "stop-1"),
            ReminderKey::new("trip-2", "stop-9"),
        ]
    );
    assert_eq!(reopened.get(&ReminderKey::new("trip-1", "stop-1"))?, Some(valid()));
    Ok(())
}

#[test]
fn json_store_delete_is_persisted() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("reminders.json");

    let store = JsonFileReminderStore::open(&path)?;
    store.upsert(valid())?;
    assert!(store.delete(&valid().key())?);
    assert!(!store.delete(&valid().key())?);

    let reopened = JsonFileReminderStore::open(&path)?;
    assert!(reopened.list_all()?.is_empty());
    Ok(())
}

#[test]
fn invalid_stored_rows_are_dropped_on_load() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("reminders.json");
    fs::write(
        &path,
        r#"[
          {"trip_id": "good", "stop_id": "s", "route_id": "r",
           "departure_time_of_day": 480, "reminder_lead_minutes": 10, "repeat_days": 0},
          {"trip_id": "bad-lead", "stop_id": "s", "route_id": "r",
           "departure_time_of_day": 480, "reminder_lead_minutes": 7, "repeat_days": 0},
          {"trip_id": "bad-mask", "stop_id": "s", "route_id": "r",
           "departure_time_of_day": 480, "reminder_lead_minutes": 10, "repeat_days": 255}
        ]"#,
    )?;

    let store = JsonFileReminderStore::open(&path)?;

    let trips: Vec<String> = store.list_all()?.into_iter().map(|r| r.trip_id).collect();
    assert_eq!(trips, vec!["good".to_string()]);
    Ok(())
}

#[test]
fn unreadable_store_file_is_a_store_error() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("reminders.json");
    fs::write(&path, "{ not json")?;

    let err = JsonFileReminderStore::open(&path).expect_err("corrupt file must fail");
    assert!(matches!(err, TripwatchError::StoreError(_)), "unexpected error: {err}");
    Ok(())
}

#[test]
fn rejected_upsert_leaves_the_file_untouched() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("reminders.json");
    let store = JsonFileReminderStore::open(&path)?;
    store.upsert(valid())?;
    let before = fs::read_to_string(&path)?;

    let mut bad = valid();
    bad.reminder_lead_minutes = 4;
    assert!(store.upsert(bad).is_err());

    assert_eq!(fs::read_to_string(&path)?, before);
    assert_eq!(store.list_all()?, vec![valid()]);
    Ok(())
}
