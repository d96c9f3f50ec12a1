// src/config/settings.rs

//! Effective settings for one invocation: the validated config file with
//! command-line overrides applied and every path resolved.

use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, WatchedSpec};
use crate::config::validate::{parse_interval_field, validate_exclude_patterns, validate_prefix};
use crate::errors::{BackwatchError, Result};
use crate::paths::{home_dir, resolve_against};
use crate::schedule::Interval;
use crate::state::{current_username, default_prefix, ConfiguredEntry};

/// File name of the default state file under `$HOME`.
pub const DEFAULT_STATE_FILE: &str = ".backwatch.state";

/// Values taken from the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub remote: Option<String>,
    /// Ad-hoc directories for this run.
    pub watched: Vec<PathBuf>,
    /// Exclude patterns for the ad-hoc directories.
    pub exclude: Vec<String>,
    pub prefix: Option<String>,
    pub frequency: Option<String>,
    pub notify: bool,
    pub dry_run: bool,
    pub state_path: Option<PathBuf>,
}

/// Facts about the invoking user that path and prefix resolution depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub home: PathBuf,
    pub cwd: PathBuf,
    pub username: Option<String>,
}

impl Environment {
    pub fn detect() -> Result<Self> {
        Ok(Self {
            home: home_dir()?,
            cwd: std::env::current_dir()?,
            username: current_username(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Required by backup/restore; see [`Settings::require_remote`].
    pub remote: Option<String>,
    pub configured: Vec<ConfiguredEntry>,
    pub adhoc: Vec<PathBuf>,
    pub adhoc_excludes: Vec<String>,
    /// Global exclude patterns.
    pub exclude: Vec<String>,
    pub prefix: String,
    pub frequency: Interval,
    pub notify: bool,
    pub credential: Option<String>,
    pub dry_run: bool,
    pub state_path: PathBuf,
    pub binary: PathBuf,
    pub sync_timeout: Option<Interval>,
    pub kill_grace: Interval,
    pub parallel: usize,
    pub probe_url: String,
    pub home: PathBuf,
}

impl Settings {
    /// Apply `overrides` on top of `cfg`.
    ///
    /// Config paths are anchored at `$HOME`, command-line paths at the
    /// current directory.
    pub fn resolve(cfg: ConfigFile, overrides: Overrides, env: &Environment) -> Result<Self> {
        let home = env.home.clone();

        let remote = overrides
            .remote
            .or(cfg.remote)
            .filter(|r| !r.trim().is_empty());

        let prefix = match overrides.prefix.or(cfg.prefix) {
            Some(prefix) => {
                validate_prefix(&prefix)?;
                prefix
            }
            None => {
                let user = env.username.as_deref().ok_or_else(|| {
                    BackwatchError::config(
                        "cannot determine the username for the default prefix; set `prefix`",
                    )
                })?;
                default_prefix(user)
            }
        };

        let frequency = match overrides.frequency {
            Some(freq) => parse_interval_field("frequency", &freq)?,
            None => cfg.frequency,
        };

        validate_exclude_patterns(&overrides.exclude)?;

        let configured = cfg
            .watched
            .iter()
            .map(|spec| configured_entry(spec, &home))
            .collect();

        let adhoc = overrides
            .watched
            .iter()
            .map(|p| resolve_against(p, &env.cwd, &home))
            .collect();

        let state_path = match (overrides.state_path, cfg.state_path) {
            (Some(path), _) => resolve_against(&path, &env.cwd, &home),
            (None, Some(path)) => resolve_against(&path, &home, &home),
            (None, None) => home.join(DEFAULT_STATE_FILE),
        };

        // A configured token turns notifications on by itself.
        let credential = cfg.pushbullet.filter(|c| !c.trim().is_empty());
        let notify = overrides.notify || cfg.notify || credential.is_some();
        if notify && credential.is_none() {
            return Err(BackwatchError::config(
                "notifications are enabled but no `pushbullet` access token is configured",
            ));
        }

        Ok(Self {
            remote,
            configured,
            adhoc,
            adhoc_excludes: overrides.exclude,
            exclude: cfg.exclude,
            prefix,
            frequency,
            notify,
            credential,
            dry_run: overrides.dry_run,
            state_path,
            binary: PathBuf::from(cfg.binary),
            sync_timeout: cfg.sync_timeout,
            kill_grace: cfg.kill_grace,
            parallel: cfg.parallel,
            probe_url: cfg.probe_url,
            home,
        })
    }

    /// The remote, or a `ConfigError` when none was configured.
    pub fn require_remote(&self) -> Result<&str> {
        self.remote.as_deref().ok_or_else(|| {
            BackwatchError::config("no remote configured; set `remote` or pass --remote")
        })
    }
}

fn configured_entry(spec: &WatchedSpec, home: &Path) -> ConfiguredEntry {
    match spec {
        WatchedSpec::Path(path) => ConfiguredEntry::new(resolve_against(path, home, home)),
        WatchedSpec::Detailed {
            path,
            bucket,
            exclude,
        } => ConfiguredEntry {
            path: resolve_against(path, home, home),
            bucket: bucket.clone(),
            exclude: exclude.clone(),
        },
    }
}
