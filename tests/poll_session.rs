// tests/poll_session.rs

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;

use tripwatch::arrivals::ArrivalRecord;
use tripwatch::notify::OpenTarget;
use tripwatch::poll::{
    PollContext, PollOutcome, PollParams, PollSession, PollState, PollStep, run_poll_session,
};
use tripwatch::reminder::TripReminder;
use tripwatch::schedule::PollTrigger;
use tripwatch_test_utils::builders::{TripReminderBuilder, predicted, scheduled_only, utc};
use tripwatch_test_utils::fakes::{PausedClock, RecordingNotificationSink, ScriptedArrivalSource};
use tripwatch_test_utils::{init_tracing, with_timeout};

const TRIP: &str = "trip-1";
const NOTHING: &[ArrivalRecord] = &[];

fn base() -> DateTime<Utc> {
    utc(2024, 6, 3, 7, 40)
}

fn reminder() -> TripReminder {
    TripReminderBuilder::new(TRIP, "stop-1")
        .departs("08:00")
        .lead(10)
        .build()
}

fn trigger_for(reminder: &TripReminder) -> PollTrigger {
    PollTrigger {
        key: reminder.key(),
        trigger_at: utc(2024, 6, 3, 7, 40),
        remind_at: utc(2024, 6, 3, 7, 50),
        departure_at: utc(2024, 6, 3, 8, 0),
    }
}

fn context(source: &ScriptedArrivalSource, sink: &RecordingNotificationSink) -> PollContext {
    PollContext {
        arrivals: Arc::new(source.clone()),
        sink: Arc::new(sink.clone()),
        clock: Arc::new(PausedClock::starting_at(base())),
        params: PollParams::default(),
        default_title: "Tripwatch".to_string(),
    }
}

fn session() -> PollSession {
    let r = reminder();
    PollSession::for_trigger(&r, &trigger_for(&r), PollParams::default())
}

// ---- pure state machine -------------------------------------------------

#[test]
fn due_arrival_on_first_observation_notifies() {
    let mut s = session();
    let arrivals = vec![predicted(TRIP, utc(2024, 6, 3, 7, 45))];

    let step = s.observe(Some(arrivals.as_slice()), base());

    match step {
        PollStep::Notify { arrival_at, .. } => assert_eq!(arrival_at, utc(2024, 6, 3, 7, 45)),
        other => panic!("expected Notify, got {other:?}"),
    }
    assert_eq!(s.state(), PollState::Notified);
    assert_eq!(s.attempts(), 1);
}

#[test]
fn notified_session_never_notifies_again() {
    let mut s = session();
    let arrivals = vec![predicted(TRIP, utc(2024, 6, 3, 7, 45))];

    assert!(matches!(s.observe(Some(arrivals.as_slice()), base()), PollStep::Notify { .. }));
    for minute in 1..5 {
        let step = s.observe(Some(arrivals.as_slice()), base() + Duration::minutes(minute));
        assert_eq!(step, PollStep::Done);
    }
    assert_eq!(s.state(), PollState::Notified);
}

#[test]
fn arrival_not_yet_due_moves_to_found_and_continues() {
    let mut s = session();
    let arrivals = vec![predicted(TRIP, utc(2024, 6, 3, 8, 5))];

    assert_eq!(s.observe(Some(arrivals.as_slice()), base()), PollStep::Continue);
    assert_eq!(s.state(), PollState::Found);
}

#[test]
fn scheduled_time_is_used_when_prediction_is_missing() {
    let mut s = session();
    let arrivals = vec![scheduled_only(TRIP, utc(2024, 6, 3, 7, 49))];

    let step = s.observe(Some(arrivals.as_slice()), base());

    assert!(matches!(step, PollStep::Notify { .. }));
}

#[test]
fn other_trips_are_ignored() {
    let mut s = session();
    let arrivals = vec![predicted("trip-2", utc(2024, 6, 3, 7, 41))];

    assert_eq!(s.observe(Some(arrivals.as_slice()), base()), PollStep::Continue);
    assert_eq!(s.state(), PollState::NotFound);
}

#[test]
fn failed_query_leaves_state_unchanged() {
    let mut s = session();
    let later = vec![predicted(TRIP, utc(2024, 6, 3, 8, 30))];
    assert_eq!(s.observe(Some(later.as_slice()), base()), PollStep::Continue);

    assert_eq!(s.observe(None, base() + Duration::seconds(30)), PollStep::Continue);
    assert_eq!(s.state(), PollState::Found);
    assert_eq!(s.attempts(), 2);
}

#[test]
fn not_found_gives_up_only_after_deadline_plus_lookahead() {
    let mut s = session();
    let deadline = utc(2024, 6, 3, 8, 0);

    assert_eq!(s.observe(None, deadline + Duration::minutes(10)), PollStep::Continue);
    assert_eq!(
        s.observe(None, deadline + Duration::minutes(10) + Duration::seconds(1)),
        PollStep::GiveUp
    );
}

#[test]
fn found_trip_that_never_becomes_due_gets_grace_then_gives_up() {
    let mut s = session();
    let deadline = utc(2024, 6, 3, 8, 0);
    let far_away = vec![predicted(TRIP, utc(2024, 6, 3, 12, 0))];

    assert_eq!(s.observe(Some(far_away.as_slice()), base()), PollStep::Continue);
    assert_eq!(
        s.observe(Some(far_away.as_slice()), deadline + Duration::minutes(11)),
        PollStep::Continue
    );
    // The trip vanishes; the grace period still applies.
    assert_eq!(s.observe(Some(NOTHING), deadline + Duration::minutes(69)), PollStep::Continue);
    assert_eq!(s.observe(Some(NOTHING), deadline + Duration::minutes(71)), PollStep::GiveUp);
    assert_eq!(s.state(), PollState::Found);
}

// ---- async runner -------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn first_poll_due_notifies_exactly_once() {
    init_tracing();

    let source = ScriptedArrivalSource::new()
        .repeat_arrivals(vec![predicted(TRIP, utc(2024, 6, 3, 7, 45))], 10);
    let sink = RecordingNotificationSink::new();
    let ctx = context(&source, &sink);
    let r = reminder();

    let report = with_timeout(
        StdDuration::from_secs(60),
        run_poll_session(&ctx, &r, &trigger_for(&r), &CancellationToken::new()),
    )
    .await;

    assert_eq!(report.outcome, PollOutcome::Notified);
    assert_eq!(report.final_state, PollState::Notified);
    assert_eq!(report.attempts, 1);
    assert_eq!(source.query_count(), 1);

    let sent = sink.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Tripwatch");
    assert_eq!(sent[0].body, "Route R1 arriving in 10 min");
    assert_eq!(
        sent[0].on_open,
        OpenTarget::StopArrivals {
            stop_id: "stop-1".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn errors_until_deadline_abandon_without_notification() {
    init_tracing();

    let mut source = ScriptedArrivalSource::new();
    for _ in 0..500 {
        source = source.then_error("connection refused");
    }
    let sink = RecordingNotificationSink::new();
    let ctx = context(&source, &sink);
    let r = reminder();

    let report = with_timeout(
        StdDuration::from_secs(3600),
        run_poll_session(&ctx, &r, &trigger_for(&r), &CancellationToken::new()),
    )
    .await;

    assert_eq!(report.outcome, PollOutcome::Abandoned);
    assert_eq!(report.final_state, PollState::NotFound);
    assert_eq!(sink.count(), 0);
    // 07:40 to 08:10 every 30 s, plus the first query past the deadline.
    assert_eq!(report.attempts, 62);
    assert_eq!(source.query_count(), 62);
}

#[tokio::test(start_paused = true)]
async fn errors_then_due_arrival_recovers_and_notifies() {
    init_tracing();

    let source = ScriptedArrivalSource::new()
        .then_error("timeout")
        .then_error("timeout")
        .then_arrivals(vec![ArrivalRecord {
            route_short_name: Some("44".to_string()),
            ..predicted(TRIP, utc(2024, 6, 3, 7, 50))
        }]);
    let sink = RecordingNotificationSink::new();
    let ctx = context(&source, &sink);
    let r = TripReminderBuilder::new(TRIP, "stop-1")
        .departs("08:00")
        .lead(10)
        .name("Morning bus")
        .build();

    let report = with_timeout(
        StdDuration::from_secs(600),
        run_poll_session(&ctx, &r, &trigger_for(&r), &CancellationToken::new()),
    )
    .await;

    assert_eq!(report.outcome, PollOutcome::Notified);
    assert_eq!(report.attempts, 3);

    let sent = sink.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Morning bus");
    assert_eq!(sent[0].body, "Route 44 arriving in 10 min");
}

#[tokio::test(start_paused = true)]
async fn past_arrival_is_reported_as_departed() {
    let source = ScriptedArrivalSource::new()
        .then_arrivals(vec![predicted(TRIP, utc(2024, 6, 3, 7, 38))]);
    let sink = RecordingNotificationSink::new();
    let ctx = context(&source, &sink);
    let r = reminder();

    run_poll_session(&ctx, &r, &trigger_for(&r), &CancellationToken::new()).await;

    assert_eq!(sink.notifications()[0].body, "Route R1 has departed");
}

#[tokio::test(start_paused = true)]
async fn cancellation_while_sleeping_ends_without_notification() {
    init_tracing();

    // Empty responses: the trip is never found.
    let source = ScriptedArrivalSource::new();
    let sink = RecordingNotificationSink::new();
    let ctx = context(&source, &sink);
    let r = reminder();
    let trigger = trigger_for(&r);
    let cancel = CancellationToken::new();

    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { run_poll_session(&ctx, &r, &trigger, &cancel).await })
    };

    tokio::time::sleep(StdDuration::from_secs(95)).await;
    cancel.cancel();

    let report = with_timeout(StdDuration::from_secs(5), handle)
        .await
        .expect("poll task panicked");

    assert_eq!(report.outcome, PollOutcome::Cancelled);
    assert_eq!(sink.count(), 0);
    // Queries at 0 s, 30 s, 60 s and 90 s.
    assert_eq!(report.attempts, 4);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_token_stops_before_first_query() {
    let source = ScriptedArrivalSource::new();
    let sink = RecordingNotificationSink::new();
    let ctx = context(&source, &sink);
    let r = reminder();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = run_poll_session(&ctx, &r, &trigger_for(&r), &cancel).await;

    assert_eq!(report.outcome, PollOutcome::Cancelled);
    assert_eq!(report.attempts, 0);
    assert_eq!(source.query_count(), 0);
}
