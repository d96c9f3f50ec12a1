// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! A synchronizer that runs and exits non-zero is *not* an error here: the
//! executor reports it as `Ok(false)`. Likewise a corrupt state file is
//! recovered inside the state store and never surfaces.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("failed to launch '{program}': {source}")]
    LaunchError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("State error: {0}")]
    StateError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackwatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        BackwatchError::ConfigError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, BackwatchError>;
