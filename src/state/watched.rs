// src/state/watched.rs

//! The in-memory watched set and its assembly from persisted state,
//! configuration and ad-hoc arguments.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::Result;
use crate::state::WatchedEntry;

/// A directory declared in configuration, with its path already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredEntry {
    pub path: PathBuf,
    /// Explicit bucket override; derived from the prefix when `None`.
    pub bucket: Option<String>,
    /// Entry-specific exclude patterns; `None` keeps whatever is persisted.
    pub exclude: Option<Vec<String>>,
}

impl ConfiguredEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bucket: None,
            exclude: None,
        }
    }
}

/// Watched entries keyed (and ordered) by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchedSet {
    entries: BTreeMap<PathBuf, WatchedEntry>,
}

impl WatchedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list; on duplicate paths the first entry wins.
    pub fn from_entries(entries: impl IntoIterator<Item = WatchedEntry>) -> Self {
        let mut set = Self::new();
        for entry in entries {
            let path = entry.path().to_path_buf();
            if !set.insert_if_absent(entry) {
                warn!(path = %path.display(), "duplicate watched path; keeping the first entry");
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchedEntry> {
        self.entries.values()
    }

    pub fn get(&self, path: &Path) -> Option<&WatchedEntry> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut WatchedEntry> {
        self.entries.get_mut(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert unless the path is already watched. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, entry: WatchedEntry) -> bool {
        if self.entries.contains_key(entry.path()) {
            return false;
        }
        self.entries.insert(entry.path().to_path_buf(), entry);
        true
    }

    pub fn to_vec(&self) -> Vec<WatchedEntry> {
        self.entries.values().cloned().collect()
    }

    /// Merge the three entry sources by path identity.
    ///
    /// Precedence:
    /// - persisted entries come first and own `last_synced` and `bucket`;
    /// - configured entries add new paths, and may replace the exclude list of
    ///   an existing one, but never rename its bucket;
    /// - ad-hoc paths are added only when not already watched.
    pub fn assemble(
        persisted: Vec<WatchedEntry>,
        configured: &[ConfiguredEntry],
        adhoc: &[PathBuf],
        adhoc_excludes: &[String],
        prefix: &str,
    ) -> Result<Self> {
        let mut set = Self::from_entries(persisted);

        for cfg in configured {
            match set.get_mut(&cfg.path) {
                Some(existing) => {
                    if let Some(bucket) = &cfg.bucket {
                        if bucket != existing.bucket() {
                            warn!(
                                path = %cfg.path.display(),
                                configured = %bucket,
                                persisted = %existing.bucket(),
                                "configured bucket differs from the persisted one; keeping persisted bucket"
                            );
                        }
                    }
                    if let Some(exclude) = &cfg.exclude {
                        existing.set_excludes(exclude.clone());
                    }
                }
                None => {
                    let entry = match &cfg.bucket {
                        Some(bucket) => WatchedEntry::new(cfg.path.clone(), bucket.clone()),
                        None => WatchedEntry::with_derived_bucket(cfg.path.clone(), prefix)?,
                    }
                    .with_excludes(cfg.exclude.clone().unwrap_or_default());
                    debug!(path = %cfg.path.display(), bucket = %entry.bucket(), "watching configured directory");
                    set.insert_if_absent(entry);
                }
            }
        }

        for path in adhoc {
            if set.contains(path) {
                debug!(path = %path.display(), "ad-hoc directory already watched");
                continue;
            }
            let entry = WatchedEntry::with_derived_bucket(path.clone(), prefix)?
                .with_excludes(adhoc_excludes.to_vec());
            debug!(path = %path.display(), bucket = %entry.bucket(), "watching ad-hoc directory");
            set.insert_if_absent(entry);
        }

        Ok(set)
    }
}

impl<'a> IntoIterator for &'a WatchedSet {
    type Item = &'a WatchedEntry;
    type IntoIter = std::collections::btree_map::Values<'a, PathBuf, WatchedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
