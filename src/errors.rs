// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TripwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid reminder: {0}")]
    InvalidReminder(String),

    #[error("Reminder not found: trip '{trip_id}' at stop '{stop_id}'")]
    ReminderNotFound { trip_id: String, stop_id: String },

    #[error("Reminder store error: {0}")]
    StoreError(String),

    #[error("Arrival source error: {0}")]
    ArrivalsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TripwatchError>;
