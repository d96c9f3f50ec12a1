// src/state/entry.rs

//! The watched-directory entity and bucket naming.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::errors::{BackwatchError, Result};

/// Number of hex characters of the username hash used as default prefix.
const PREFIX_LEN: usize = 10;

/// One directory under management.
///
/// `path` is the identity key within a [`WatchedSet`](super::WatchedSet).
/// `bucket` is fixed once assigned; nothing in the crate recomputes it for
/// an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedEntry {
    path: PathBuf,
    bucket: String,
    last_synced: Option<DateTime<Utc>>,
    excludes: Vec<String>,
}

impl WatchedEntry {
    pub fn new(path: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            bucket: bucket.into(),
            last_synced: None,
            excludes: Vec::new(),
        }
    }

    /// New entry whose bucket is `{prefix}-{basename(path)}`.
    pub fn with_derived_bucket(path: impl Into<PathBuf>, prefix: &str) -> Result<Self> {
        let path = path.into();
        let bucket = derive_bucket(prefix, &path)?;
        Ok(Self::new(path, bucket))
    }

    pub fn with_last_synced(mut self, synced: Option<DateTime<Utc>>) -> Self {
        self.last_synced = synced;
        self
    }

    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `None` means never synced; such entries are always stale.
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.last_synced
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub(crate) fn set_excludes(&mut self, excludes: Vec<String>) {
        self.excludes = excludes;
    }

    /// Record a successful push or pull.
    pub fn mark_synced(&mut self, at: DateTime<Utc>) {
        self.last_synced = Some(at);
    }
}

/// Derive a bucket name as `{prefix}-{basename(path)}`.
pub fn derive_bucket(prefix: &str, path: &Path) -> Result<String> {
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            BackwatchError::config(format!(
                "cannot derive a bucket name for {:?}: path has no usable base name",
                path
            ))
        })?;
    Ok(format!("{prefix}-{base}"))
}

/// Stable per-user prefix: the first hex characters of `blake3(username)`.
pub fn default_prefix(username: &str) -> String {
    let hash = blake3::hash(username.as_bytes()).to_hex();
    hash[..PREFIX_LEN].to_string()
}

/// Name of the invoking user, from `USER` or `USERNAME`.
pub fn current_username() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}
