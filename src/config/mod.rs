// src/config/mod.rs

//! Configuration loading and validation for backwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate patterns, intervals and scalar keys (`validate.rs`).
//! - Merge command-line overrides into effective settings (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_config, load_from_path};
pub use model::{ConfigFile, RawConfigFile, WatchedSpec};
pub use settings::{Environment, Overrides, Settings};
