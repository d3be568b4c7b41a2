// tests/reminder_cli.rs

use chrono::Weekday;
use clap::Parser;

use tripwatch::cli::{CliArgs, Command};
use tripwatch::notify::arrival_label;
use tripwatch::reminder::{RepeatDays, format_time_of_day, parse_time_of_day};

#[test]
fn repeat_days_keywords_and_lists() {
    assert_eq!("once".parse::<RepeatDays>().unwrap(), RepeatDays::ONCE);
    assert_eq!("daily".parse::<RepeatDays>().unwrap().bits(), 0x7F);
    assert_eq!("weekends".parse::<RepeatDays>().unwrap().bits(), 0b100_0001);
    assert_eq!("Weekdays".parse::<RepeatDays>().unwrap().bits(), 0b011_1110);

    let mwf: RepeatDays = "mon, wed,fri".parse().unwrap();
    assert_eq!(
        mwf.days().collect::<Vec<_>>(),
        vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
    );
    assert_eq!(mwf.to_string(), "Mon,Wed,Fri");
    assert_eq!(RepeatDays::ONCE.to_string(), "once");

    assert!("mon,funday".parse::<RepeatDays>().is_err());
}

#[test]
fn time_of_day_parses_and_formats() {
    assert_eq!(parse_time_of_day("08:00"), Ok(480));
    assert_eq!(parse_time_of_day(" 23:59 "), Ok(1439));
    assert_eq!(parse_time_of_day("00:00"), Ok(0));
    assert!(parse_time_of_day("24:00").is_err());
    assert!(parse_time_of_day("8am").is_err());

    assert_eq!(format_time_of_day(485), "08:05");
}

#[test]
fn lead_label_wording() {
    assert_eq!(arrival_label(10), "arriving in 10 min");
    assert_eq!(arrival_label(1), "arriving in 1 min");
    assert_eq!(arrival_label(0), "is departing now");
}

#[test]
fn add_command_parses_every_field() {
    let args = CliArgs::try_parse_from([
        "tripwatch",
        "--config",
        "/tmp/t.toml",
        "add",
        "--trip",
        "1_100",
        "--stop",
        "1_75403",
        "--route",
        "44",
        "--departure",
        "07:45",
        "--lead",
        "5",
        "--days",
        "weekdays",
    ])
    .expect("valid command line");

    assert_eq!(args.config.to_str(), Some("/tmp/t.toml"));
    match args.command {
        Command::Add(add) => {
            assert_eq!(add.trip, "1_100");
            assert_eq!(add.stop, "1_75403");
            assert_eq!(add.route, "44");
            assert_eq!(add.departure, 465);
            assert_eq!(add.lead, 5);
            assert_eq!(add.days.bits(), 0b011_1110);
            assert_eq!(add.name, "");
        }
        other => panic!("expected add, got {other:?}"),
    }
}

#[test]
fn add_defaults_to_one_time_with_ten_minute_lead() {
    let args = CliArgs::try_parse_from([
        "tripwatch", "add", "--trip", "t", "--stop", "s", "--route", "r", "--departure", "08:00",
    ])
    .expect("valid command line");

    match args.command {
        Command::Add(add) => {
            assert_eq!(add.lead, 10);
            assert_eq!(add.days, RepeatDays::ONCE);
        }
        other => panic!("expected add, got {other:?}"),
    }
}

#[test]
fn malformed_departure_is_rejected_by_the_parser() {
    let result = CliArgs::try_parse_from([
        "tripwatch", "add", "--trip", "t", "--stop", "s", "--route", "r", "--departure", "25:00",
    ]);

    assert!(result.is_err());
}

#[test]
fn remove_and_global_log_level() {
    let args = CliArgs::try_parse_from([
        "tripwatch",
        "remove",
        "--trip",
        "t",
        "--stop",
        "s",
        "--log-level",
        "debug",
    ])
    .expect("valid command line");

    assert!(args.log_level.is_some());
    assert!(matches!(args.command, Command::Remove(ref k) if k.trip == "t" && k.stop == "s"));
}
