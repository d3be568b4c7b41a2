// src/lib.rs

pub mod alarm;
pub mod arrivals;
pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod notify;
pub mod poll;
pub mod reminder;
pub mod schedule;
pub mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::alarm::TokioAlarmTimer;
use crate::arrivals::ObaArrivalSource;
use crate::cli::{AddArgs, CliArgs, Command, ReminderKeyArgs};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigFile, load_and_validate};
use crate::engine::{Engine, EngineEvent, Operations};
use crate::errors::TripwatchError;
use crate::lifecycle::{LogKeepAwake, TaskLifecycleManager};
use crate::notify::LogNotificationSink;
use crate::poll::PollContext;
use crate::reminder::{ReminderKey, TripReminder, format_time_of_day};
use crate::store::{JsonFileReminderStore, ReminderStore};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;

    match args.command {
        Command::Run => run_daemon(cfg).await,
        Command::Add(add) => add_reminder(&cfg, add),
        Command::Remove(key) => remove_reminder(&cfg, key),
        Command::List => list_reminders(&cfg),
        Command::Plan => print_plan(&cfg),
    }
}

fn open_store(cfg: &ConfigFile) -> Result<JsonFileReminderStore> {
    JsonFileReminderStore::open(&cfg.store.path)
        .with_context(|| format!("opening reminder store {}", cfg.store.path.display()))
}

/// Host the engine until Ctrl-C.
///
/// This wires together:
/// - the JSON reminder store
/// - the HTTP arrival source
/// - the tokio alarm timer feeding the engine channel
/// - the lifecycle manager and its keep-awake resource
/// - Ctrl-C handling
///
/// `add` and `remove` are separate processes that only write the store. A
/// running daemon does not see those writes until its next start, when
/// `ScheduleAll` re-reads the store. `ReminderSaved`, `ReminderDeleted` and
/// `CancelPoll` are for hosts that embed the [`Engine`] and share its sender.
async fn run_daemon(cfg: ConfigFile) -> Result<()> {
    let store: Arc<dyn ReminderStore> = Arc::new(open_store(&cfg)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(64);

    let alarms = Arc::new(TokioAlarmTimer::new(event_tx.clone(), Arc::clone(&clock)));
    let arrivals = Arc::new(ObaArrivalSource::new(&cfg.arrivals)?);

    let poll = PollContext {
        arrivals,
        sink: Arc::new(LogNotificationSink),
        clock,
        params: cfg.poll_params(),
        default_title: cfg.notifications.default_title.clone(),
    };

    let ops = Operations::new(store, alarms, cfg.schedule_computer(), poll);
    let lifecycle = TaskLifecycleManager::new(Arc::new(LogKeepAwake::new()));
    let engine = Engine::new(event_rx, ops, lifecycle, cfg.shutdown_grace());

    // Ctrl-C → graceful shutdown.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(EngineEvent::ShutdownRequested).await;
        });
    }

    info!(
        store = %cfg.store.path.display(),
        timezone = %cfg.engine.timezone,
        "starting reminder daemon"
    );
    event_tx.send(EngineEvent::Restarted).await?;

    engine.run().await?;
    Ok(())
}

fn add_reminder(cfg: &ConfigFile, args: AddArgs) -> Result<()> {
    let store = open_store(cfg)?;

    let reminder = TripReminder {
        trip_id: args.trip,
        stop_id: args.stop,
        route_id: args.route,
        headsign: args.headsign,
        display_name: args.name,
        departure_time_of_day: args.departure,
        reminder_lead_minutes: args.lead,
        repeat_days: args.days,
    };
    let key = reminder.key();

    store.upsert(reminder)?;
    println!("saved reminder {key}");
    Ok(())
}

fn remove_reminder(cfg: &ConfigFile, args: ReminderKeyArgs) -> Result<()> {
    let store = open_store(cfg)?;
    let key = ReminderKey::new(args.trip, args.stop);

    if !store.delete(&key)? {
        return Err(TripwatchError::ReminderNotFound {
            trip_id: key.trip_id,
            stop_id: key.stop_id,
        }
        .into());
    }
    println!("removed reminder {key}");
    Ok(())
}

fn list_reminders(cfg: &ConfigFile) -> Result<()> {
    let store = open_store(cfg)?;
    let reminders = store.list_all()?;

    println!("reminders ({}):", reminders.len());
    for r in reminders.iter() {
        println!("  - {}", r.key());
        println!("      route: {}", r.route_id);
        if !r.headsign.is_empty() {
            println!("      headsign: {}", r.headsign);
        }
        if !r.display_name.is_empty() {
            println!("      name: {}", r.display_name);
        }
        println!("      departure: {}", format_time_of_day(r.departure_time_of_day));
        println!("      lead: {} min", r.reminder_lead_minutes);
        println!("      repeat: {}", r.repeat_days);
    }
    Ok(())
}

/// Dry run: print the triggers schedule-all would arm now, in local time.
fn print_plan(cfg: &ConfigFile) -> Result<()> {
    let store = open_store(cfg)?;
    let computer = cfg.schedule_computer();
    let tz = computer.timezone();
    let now = SystemClock.now();

    let mut triggers: Vec<_> = store
        .list_all()?
        .iter()
        .flat_map(|r| computer.compute(r, now))
        .collect();
    triggers.sort_by_key(|t| t.trigger_at);

    println!("tripwatch plan (now {}, {tz})", now.with_timezone(&tz).format("%a %Y-%m-%d %H:%M"));
    println!("triggers ({}):", triggers.len());
    for t in triggers.iter() {
        println!(
            "  - {}  poll at {}  remind at {}  departs {}",
            t.key,
            t.trigger_at.with_timezone(&tz).format("%a %Y-%m-%d %H:%M"),
            t.remind_at.with_timezone(&tz).format("%H:%M"),
            t.departure_at.with_timezone(&tz).format("%H:%M"),
        );
    }

    debug!("plan complete (nothing armed)");
    Ok(())
}
