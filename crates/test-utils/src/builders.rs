#![allow(dead_code)]

use std::path::{Path, PathBuf};

use backwatch::config::Settings;
use backwatch::schedule::Interval;
use backwatch::state::{ConfiguredEntry, WatchedEntry};
use chrono::{DateTime, Utc};

/// Builder for `Settings` with test-friendly defaults:
/// remote `remote`, prefix `abc123`, frequency `1d`, home `/home/u`.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        let home = PathBuf::from("/home/u");
        Self {
            settings: Settings {
                remote: Some("remote".to_string()),
                configured: Vec::new(),
                adhoc: Vec::new(),
                adhoc_excludes: Vec::new(),
                exclude: Vec::new(),
                prefix: "abc123".to_string(),
                frequency: "1d".parse().expect("valid interval"),
                notify: false,
                credential: None,
                dry_run: false,
                state_path: home.join(".backwatch.state"),
                binary: PathBuf::from("rclone"),
                sync_timeout: None,
                kill_grace: Interval::from_secs(10),
                parallel: 1,
                probe_url: "https://www.google.com".to_string(),
                home,
            },
        }
    }

    pub fn remote(mut self, remote: Option<&str>) -> Self {
        self.settings.remote = remote.map(str::to_string);
        self
    }

    /// Watch `path` from configuration, with a derived bucket.
    pub fn watch(mut self, path: impl AsRef<Path>) -> Self {
        self.settings
            .configured
            .push(ConfiguredEntry::new(path.as_ref()));
        self
    }

    pub fn watch_entry(mut self, entry: ConfiguredEntry) -> Self {
        self.settings.configured.push(entry);
        self
    }

    pub fn adhoc(mut self, path: impl AsRef<Path>) -> Self {
        self.settings.adhoc.push(path.as_ref().to_path_buf());
        self
    }

    pub fn adhoc_exclude(mut self, pattern: &str) -> Self {
        self.settings.adhoc_excludes.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.settings.exclude.push(pattern.to_string());
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.settings.prefix = prefix.to_string();
        self
    }

    pub fn frequency(mut self, freq: &str) -> Self {
        self.settings.frequency = freq.parse().expect("valid interval");
        self
    }

    pub fn notify(mut self, token: &str) -> Self {
        self.settings.notify = true;
        self.settings.credential = Some(token.to_string());
        self
    }

    pub fn dry_run(mut self, val: bool) -> Self {
        self.settings.dry_run = val;
        self
    }

    pub fn parallel(mut self, n: usize) -> Self {
        self.settings.parallel = n;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `WatchedEntry`.
pub struct EntryBuilder {
    entry: WatchedEntry,
}

impl EntryBuilder {
    pub fn new(path: impl Into<PathBuf>, bucket: &str) -> Self {
        Self {
            entry: WatchedEntry::new(path, bucket),
        }
    }

    pub fn synced(mut self, at: DateTime<Utc>) -> Self {
        self.entry = self.entry.with_last_synced(Some(at));
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        let mut excludes = self.entry.excludes().to_vec();
        excludes.push(pattern.to_string());
        self.entry = self.entry.with_excludes(excludes);
        self
    }

    pub fn build(self) -> WatchedEntry {
        self.entry
    }
}
