// src/exec/sync.rs

//! Push/pull invocations of the external synchronizer.
//!
//! Invocation shape:
//!
//! ```text
//! <binary> [--dry-run] [--exclude <pattern>]* sync <source> <destination>
//! ```
//!
//! where one side is a local path and the other is `<remote>:<bucket>`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::exec::supervisor::{ExitHooks, ProcessSpec, SupervisedProcess};
use crate::state::WatchedEntry;

/// Default grace period between terminate and kill on a deadline.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Local directory to remote bucket.
    Push,
    /// Remote bucket to local directory.
    Pull,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDirection::Push => write!(f, "push"),
            SyncDirection::Pull => write!(f, "pull"),
        }
    }
}

/// One push or pull of one directory against one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub direction: SyncDirection,
    pub local: PathBuf,
    pub bucket: String,
    pub excludes: Vec<String>,
    pub dry_run: bool,
}

impl SyncJob {
    pub fn for_entry(
        direction: SyncDirection,
        entry: &WatchedEntry,
        global_excludes: &[String],
        dry_run: bool,
    ) -> Self {
        Self {
            direction,
            local: entry.path().to_path_buf(),
            bucket: entry.bucket().to_string(),
            excludes: merge_excludes(global_excludes, entry.excludes()),
            dry_run,
        }
    }
}

/// Global patterns first, then entry patterns; duplicates dropped, order kept.
pub fn merge_excludes(global: &[String], entry: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(global.len() + entry.len());
    for pattern in global.iter().chain(entry) {
        if !merged.contains(pattern) {
            merged.push(pattern.clone());
        }
    }
    merged
}

/// Drives the synchronizer binary through [`SupervisedProcess`].
///
/// No retries: a failed job is simply reported, and the caller decides.
#[derive(Debug, Clone)]
pub struct SyncExecutor {
    binary: PathBuf,
    remote: String,
    deadline: Option<Duration>,
    kill_grace: Duration,
}

impl SyncExecutor {
    pub fn new(binary: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            remote: remote.into(),
            deadline: None,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    /// Bound each invocation; on expiry terminate, then kill after `kill_grace`.
    pub fn with_deadline(mut self, deadline: Option<Duration>, kill_grace: Duration) -> Self {
        self.deadline = deadline;
        self.kill_grace = kill_grace;
        self
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// `<remote>:<bucket>`
    pub fn remote_address(&self, bucket: &str) -> String {
        format!("{}:{}", self.remote, bucket)
    }

    /// Build the exact argument vector for `job`.
    pub fn build_invocation(&self, job: &SyncJob) -> ProcessSpec {
        let mut spec = ProcessSpec::new(self.binary.as_os_str());

        if job.dry_run {
            spec = spec.arg("--dry-run");
        }
        for pattern in &job.excludes {
            spec = spec.arg("--exclude").arg(pattern);
        }

        let local = job.local.as_os_str().to_os_string();
        let remote = self.remote_address(&job.bucket);
        spec = spec.arg("sync");
        match job.direction {
            SyncDirection::Push => spec.arg(local).arg(remote),
            SyncDirection::Pull => spec.arg(remote).arg(local),
        }
    }

    /// Sync `local` up to `bucket`. `Ok(true)` iff the synchronizer exited 0.
    pub async fn push(
        &self,
        local: &Path,
        bucket: &str,
        excludes: &[String],
        dry_run: bool,
    ) -> Result<bool> {
        self.execute(&SyncJob {
            direction: SyncDirection::Push,
            local: local.to_path_buf(),
            bucket: bucket.to_string(),
            excludes: excludes.to_vec(),
            dry_run,
        })
        .await
    }

    /// Sync `bucket` down to `local`. `Ok(true)` iff the synchronizer exited 0.
    pub async fn pull(
        &self,
        bucket: &str,
        local: &Path,
        excludes: &[String],
        dry_run: bool,
    ) -> Result<bool> {
        self.execute(&SyncJob {
            direction: SyncDirection::Pull,
            local: local.to_path_buf(),
            bucket: bucket.to_string(),
            excludes: excludes.to_vec(),
            dry_run,
        })
        .await
    }

    /// Run one job to completion.
    ///
    /// `Err` only when the binary could not be started; a non-zero exit is
    /// `Ok(false)`.
    pub async fn execute(&self, job: &SyncJob) -> Result<bool> {
        let spec = self.build_invocation(job);
        let remote = self.remote_address(&job.bucket);
        let (source, destination) = match job.direction {
            SyncDirection::Push => (job.local.display().to_string(), remote),
            SyncDirection::Pull => (remote, job.local.display().to_string()),
        };

        info!(direction = %job.direction, %source, %destination, dry_run = job.dry_run, "syncing");
        debug!(command = %spec, "using command");

        let command_line = spec.to_string();
        let hooks = ExitHooks::new()
            .on_exit(|code| {
                if code == 0 {
                    info!("done syncing");
                }
            })
            .on_error(move |code| {
                error!(exit_code = code, command = %command_line, "synchronizer exited with an error");
            });

        let process = SupervisedProcess::launch(&spec, hooks)?;
        let code = match self.deadline {
            Some(deadline) => process.wait_with_deadline(deadline, self.kill_grace).await?,
            None => process.wait().await?,
        };

        Ok(code == 0)
    }
}
