// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BackwatchError, Result};
use crate::paths::home_dir;

/// File name of the default config under `$HOME`.
pub const DEFAULT_CONFIG_FILE: &str = ".backwatch.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** parse interval
/// strings or check patterns. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        BackwatchError::config(format!("reading config file {}: {e}", path.display()))
    })?;

    let config: RawConfigFile = toml::from_str(&contents).map_err(|e| {
        BackwatchError::config(format!("parsing config file {}: {e}", path.display()))
    })?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load the config the user asked for.
///
/// - An explicit path must exist.
/// - Without one, `~/.backwatch.toml` is used if present; otherwise every
///   key takes its default.
pub fn load_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let path = default_config_path()?;
    match fs::metadata(&path) {
        Ok(_) => load_and_validate(&path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file; using defaults");
            ConfigFile::try_from(RawConfigFile::default())
        }
        Err(e) => Err(BackwatchError::config(format!(
            "inspecting config file {}: {e}",
            path.display()
        ))),
    }
}

/// `~/.backwatch.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(DEFAULT_CONFIG_FILE))
}
