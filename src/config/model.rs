// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::schedule::Interval;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// remote = "b2"
/// frequency = "1d 12h"
/// exclude = ["*.tmp", ".cache"]
/// notify = true
/// pushbullet = "o.XXXX"
///
/// watched = [
///     "Documents",
///     { path = "/srv/photos", bucket = "family-photos", exclude = ["*.raw"] },
/// ]
/// ```
///
/// Every key is optional; omitted keys take the defaults below.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Synchronizer remote name (the part before `:` in `remote:bucket`).
    #[serde(default)]
    pub remote: Option<String>,

    /// Directories to keep backed up. Relative paths are anchored at `$HOME`.
    #[serde(default)]
    pub watched: Vec<WatchedSpec>,

    /// Glob patterns excluded from every sync.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Bucket name prefix; defaults to a hash of the username.
    #[serde(default)]
    pub prefix: Option<String>,

    /// How old a sync may get before the directory is due again.
    #[serde(default = "default_frequency")]
    pub frequency: String,

    #[serde(default)]
    pub notify: bool,

    /// Pushbullet access token used for notifications.
    #[serde(default)]
    pub pushbullet: Option<String>,

    /// Where the watched set is persisted; defaults to `~/.backwatch.state`.
    #[serde(default)]
    pub state_path: Option<PathBuf>,

    /// Synchronizer executable.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Optional per-invocation deadline (interval string).
    #[serde(default)]
    pub sync_timeout: Option<String>,

    /// Wait between terminate and kill once a deadline expires.
    #[serde(default = "default_kill_grace")]
    pub kill_grace: String,

    /// Maximum number of directories synced concurrently.
    #[serde(default = "default_parallel")]
    pub parallel: usize,

    /// URL probed before syncing to decide whether we are online.
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
}

fn default_frequency() -> String {
    "1d".to_string()
}

fn default_binary() -> String {
    "rclone".to_string()
}

fn default_kill_grace() -> String {
    "10s".to_string()
}

fn default_parallel() -> usize {
    1
}

fn default_probe_url() -> String {
    "https://www.google.com".to_string()
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            remote: None,
            watched: Vec::new(),
            exclude: Vec::new(),
            prefix: None,
            frequency: default_frequency(),
            notify: false,
            pushbullet: None,
            state_path: None,
            binary: default_binary(),
            sync_timeout: None,
            kill_grace: default_kill_grace(),
            parallel: default_parallel(),
            probe_url: default_probe_url(),
        }
    }
}

/// An item of the `watched` list: a bare path or a table with overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WatchedSpec {
    Path(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        bucket: Option<String>,
        #[serde(default)]
        exclude: Option<Vec<String>>,
    },
}

impl WatchedSpec {
    pub fn path(&self) -> &PathBuf {
        match self {
            WatchedSpec::Path(path) => path,
            WatchedSpec::Detailed { path, .. } => path,
        }
    }
}

/// Validated configuration: interval strings parsed, patterns checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub remote: Option<String>,
    pub watched: Vec<WatchedSpec>,
    pub exclude: Vec<String>,
    pub prefix: Option<String>,
    pub frequency: Interval,
    pub notify: bool,
    pub pushbullet: Option<String>,
    pub state_path: Option<PathBuf>,
    pub binary: String,
    pub sync_timeout: Option<Interval>,
    pub kill_grace: Interval,
    pub parallel: usize,
    pub probe_url: String,
}
