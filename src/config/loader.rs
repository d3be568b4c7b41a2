// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Read and deserialize a configuration file without semantic validation.
///
/// Use [`load_and_validate`] for the checked form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and validate it.
///
/// A file that does not exist yields the defaults, so the daemon can start
/// without any configuration. Any other read or parse error is returned.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = match load_from_path(path) {
        Ok(raw) => raw,
        Err(crate::errors::TripwatchError::IoError(err)) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "config file not found; using defaults");
            RawConfigFile::default()
        }
        Err(err) => return Err(err),
    };
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Config path used when `--config` is not given: `Tripwatch.toml` in the
/// current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Tripwatch.toml")
}
