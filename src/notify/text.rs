// src/notify/text.rs

use chrono::{DateTime, Utc};

use crate::arrivals::ArrivalRecord;
use crate::notify::{Notification, OpenTarget};
use crate::reminder::TripReminder;

/// Human label for a reminder lead time, e.g. "arriving in 10 min".
pub fn arrival_label(lead_minutes: u32) -> String {
    match lead_minutes {
        0 => "is departing now".to_string(),
        n => format!("arriving in {n} min"),
    }
}

/// Build the notification for a reminder whose arrival is due.
///
/// The route name comes from the arrival record when the source supplies
/// one, falling back to the reminder's route id. An arrival that is already
/// in the past is reported as departed.
pub fn notification_for(
    reminder: &TripReminder,
    arrival: &ArrivalRecord,
    arrival_at: DateTime<Utc>,
    now: DateTime<Utc>,
    default_title: &str,
) -> Notification {
    let route = arrival
        .route_short_name
        .as_deref()
        .unwrap_or(reminder.route_id.as_str());

    let label = if arrival_at <= now {
        "has departed".to_string()
    } else {
        arrival_label(reminder.reminder_lead_minutes)
    };

    let title = if reminder.display_name.trim().is_empty() {
        default_title.to_string()
    } else {
        reminder.display_name.clone()
    };

    Notification {
        title,
        body: format!("Route {route} {label}"),
        on_open: OpenTarget::StopArrivals {
            stop_id: reminder.stop_id.clone(),
        },
    }
}
