// src/state/store.rs

//! Persistence of the watched set between runs.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::errors::{BackwatchError, Result};
use crate::state::codec;
use crate::state::WatchedEntry;

/// Abstract storage for the watched set.
pub trait StateStore: Send {
    /// Load persisted entries.
    ///
    /// A missing or unreadable state is "no history": this never fails.
    fn load(&self) -> Vec<WatchedEntry>;

    /// Replace the persisted entries with `entries`.
    fn save(&mut self, entries: &[WatchedEntry]) -> Result<()>;
}

/// Stores the watched set in a TOML file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
    home: PathBuf,
}

impl FileStateStore {
    /// `home` anchors relative paths found in the file.
    pub fn new(path: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            home: home.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Vec<WatchedEntry> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet; starting with empty history");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file unreadable; treating history as empty");
                return Vec::new();
            }
        };

        match codec::decode(&text, &self.home) {
            Ok(entries) => {
                debug!(path = %self.path.display(), count = entries.len(), "loaded state");
                entries
            }
            Err(reason) => {
                warn!(path = %self.path.display(), %reason, "state file is corrupt; treating history as empty");
                Vec::new()
            }
        }
    }

    fn save(&mut self, entries: &[WatchedEntry]) -> Result<()> {
        let contents = codec::encode(entries)?;
        let tmp = self.temp_path();

        let state_err = |what: &str, path: &Path, e: std::io::Error| {
            BackwatchError::StateError(format!("{what} {}: {e}", path.display()))
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| state_err("creating directory", parent, e))?;
            }
        }

        {
            let mut file = File::create(&tmp).map_err(|e| state_err("creating", &tmp, e))?;
            file.write_all(contents.as_bytes())
                .map_err(|e| state_err("writing", &tmp, e))?;
            file.sync_all().map_err(|e| state_err("flushing", &tmp, e))?;
        }

        fs::rename(&tmp, &self.path).map_err(|e| state_err("replacing", &self.path, e))?;

        info!(path = %self.path.display(), count = entries.len(), "saved state");
        Ok(())
    }
}

/// Keeps the watched set in memory only.
///
/// Clones share storage, so a test can keep a handle after handing the
/// store to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: Vec<WatchedEntry>,
    saves: usize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<WatchedEntry>) -> Self {
        let store = Self::new();
        if let Ok(mut guard) = store.inner.lock() {
            guard.entries = entries;
        }
        store
    }

    /// Currently stored entries.
    pub fn entries(&self) -> Vec<WatchedEntry> {
        self.inner
            .lock()
            .map(|g| g.entries.clone())
            .unwrap_or_default()
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|g| g.saves).unwrap_or_default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Vec<WatchedEntry> {
        self.entries()
    }

    fn save(&mut self, entries: &[WatchedEntry]) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| BackwatchError::StateError("memory state store poisoned".to_string()))?;
        guard.entries = entries.to_vec();
        guard.saves += 1;
        info!(count = entries.len(), "saved state (memory)");
        Ok(())
    }
}
