// src/config/mod.rs

//! Configuration loading and validation for tripwatch.
//!
//! - `model.rs` defines the TOML-backed data model.
//! - `loader.rs` reads the file from disk.
//! - `validate.rs` checks value ranges and resolves the time zone.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ArrivalsSection, ConfigFile, EngineSection, NotificationsSection, RawConfigFile,
    RawEngineSection, StoreSection,
};
