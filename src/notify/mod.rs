// src/notify/mod.rs

//! User-visible reminder notifications.
//!
//! - [`NotificationSink`] is the seam to whatever actually shows the alert.
//! - [`LogNotificationSink`] is the daemon's default: a structured log event.
//! - [`text`] builds the notification body from the reminder and arrival.

use std::fmt::Debug;

use tracing::info;

pub mod text;

pub use text::{arrival_label, notification_for};

/// What the host should open when the user taps the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    /// Show live arrivals for this stop.
    StopArrivals { stop_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub on_open: OpenTarget,
}

/// Displays a single alert. Fire-and-forget.
pub trait NotificationSink: Send + Sync + Debug {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, notification: Notification) {
        let OpenTarget::StopArrivals { stop_id } = &notification.on_open;
        info!(
            title = %notification.title,
            stop_id = %stop_id,
            "REMINDER: {}",
            notification.body
        );
    }
}
