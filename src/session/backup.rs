// src/session/backup.rs

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::Settings;
use crate::connectivity::ConnectivityProbe;
use crate::errors::Result;
use crate::exec::{merge_excludes, SyncBackend, SyncDirection, SyncJob};
use crate::notify::{Notification, Notifier};
use crate::schedule::{Interval, ScheduleEngine};
use crate::session::SessionOutcome;
use crate::state::{StateStore, WatchedEntry, WatchedSet};

/// The part of [`Settings`] a session needs once the watched set is built.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub frequency: Interval,
    /// Global exclude patterns, applied before each entry's own.
    pub exclude: Vec<String>,
    pub dry_run: bool,
    /// Maximum concurrent sync jobs.
    pub parallel: usize,
}

impl SessionOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            frequency: settings.frequency,
            exclude: settings.exclude.clone(),
            dry_run: settings.dry_run,
            parallel: settings.parallel,
        }
    }
}

/// Everything a session talks to.
pub struct Collaborators {
    pub store: Box<dyn StateStore>,
    pub backend: Arc<dyn SyncBackend>,
    pub probe: Box<dyn ConnectivityProbe>,
    /// `None` when notifications are disabled.
    pub notifier: Option<Box<dyn Notifier>>,
    pub clock: Arc<dyn Clock>,
}

/// Orchestrates one backup or restore run.
///
/// Flow of [`backup`](Self::backup):
/// 1. probe connectivity, bail out as [`SessionOutcome::Offline`] if it fails;
/// 2. ask the schedule engine for due entries;
/// 3. push each due entry, bumping its timestamp on success;
/// 4. save the whole watched set, even after partial failure;
/// 5. send a notification if a notifier is configured.
pub struct BackupSession {
    options: SessionOptions,
    store: Box<dyn StateStore>,
    backend: Arc<dyn SyncBackend>,
    probe: Box<dyn ConnectivityProbe>,
    notifier: Option<Box<dyn Notifier>>,
    clock: Arc<dyn Clock>,
    watched: WatchedSet,
}

impl fmt::Debug for BackupSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupSession")
            .field("options", &self.options)
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

impl BackupSession {
    /// Load persisted state and merge it with the configured and ad-hoc
    /// directories from `settings`.
    pub fn open(settings: &Settings, parts: Collaborators) -> Result<Self> {
        let persisted = parts.store.load();
        debug!(persisted = persisted.len(), "loaded state");

        let watched = WatchedSet::assemble(
            persisted,
            &settings.configured,
            &settings.adhoc,
            &settings.adhoc_excludes,
            &settings.prefix,
        )?;
        info!(entries = watched.len(), "watched set assembled");

        Ok(Self::with_watched(
            SessionOptions::from_settings(settings),
            parts,
            watched,
        ))
    }

    /// Build a session around an already assembled watched set.
    pub fn with_watched(options: SessionOptions, parts: Collaborators, watched: WatchedSet) -> Self {
        Self {
            options,
            store: parts.store,
            backend: parts.backend,
            probe: parts.probe,
            notifier: parts.notifier,
            clock: parts.clock,
            watched,
        }
    }

    pub fn watched(&self) -> &WatchedSet {
        &self.watched
    }

    pub fn entries(&self) -> impl Iterator<Item = &WatchedEntry> {
        self.watched.iter()
    }

    /// Entries that are due right now.
    pub fn due_entries(&self) -> Vec<&WatchedEntry> {
        let engine = ScheduleEngine::new(self.options.frequency);
        let now = self.clock.now();
        engine.due(&self.watched, now).collect()
    }

    /// Push every due entry.
    pub async fn backup(&mut self) -> Result<SessionOutcome> {
        if !self.probe.is_online().await {
            info!("no internet connection detected; delaying backup");
            return Ok(SessionOutcome::Offline);
        }
        if self.watched.is_empty() {
            info!("no watched directories");
            return Ok(SessionOutcome::NoWatched);
        }

        let jobs: Vec<SyncJob> = self
            .due_entries()
            .into_iter()
            .map(|entry| self.job_for(SyncDirection::Push, entry))
            .collect();

        if jobs.is_empty() {
            info!(frequency = %self.options.frequency, "all watched directories are up to date");
            return Ok(SessionOutcome::UpToDate);
        }

        info!(
            due = jobs.len(),
            watched = self.watched.len(),
            dry_run = self.options.dry_run,
            "starting backup"
        );
        self.finish(jobs).await
    }

    /// Pull every watched entry, due or not.
    pub async fn restore(&mut self) -> Result<SessionOutcome> {
        if !self.probe.is_online().await {
            info!("no internet connection detected; cannot restore");
            return Ok(SessionOutcome::Offline);
        }
        if self.watched.is_empty() {
            info!("no watched directories");
            return Ok(SessionOutcome::NoWatched);
        }

        let jobs: Vec<SyncJob> = self
            .watched
            .iter()
            .map(|entry| self.job_for(SyncDirection::Pull, entry))
            .collect();

        info!(entries = jobs.len(), dry_run = self.options.dry_run, "starting restore");
        self.finish(jobs).await
    }

    /// Pull a single bucket into `dest`.
    ///
    /// The watched entry for `dest` is only marked synced when it is backed
    /// by the same bucket.
    pub async fn restore_bucket(&mut self, bucket: &str, dest: &Path) -> Result<SessionOutcome> {
        if !self.probe.is_online().await {
            info!("no internet connection detected; cannot restore");
            return Ok(SessionOutcome::Offline);
        }

        // A watched entry on the same bucket brings its own excludes.
        let excludes = match self.watched.get(dest) {
            Some(entry) if entry.bucket() == bucket => {
                merge_excludes(&self.options.exclude, entry.excludes())
            }
            _ => self.options.exclude.clone(),
        };

        let job = SyncJob {
            direction: SyncDirection::Pull,
            local: dest.to_path_buf(),
            bucket: bucket.to_string(),
            excludes,
            dry_run: self.options.dry_run,
        };

        info!(%bucket, dest = %dest.display(), "restoring bucket");
        self.finish(vec![job]).await
    }

    fn job_for(&self, direction: SyncDirection, entry: &WatchedEntry) -> SyncJob {
        SyncJob::for_entry(direction, entry, &self.options.exclude, self.options.dry_run)
    }

    async fn finish(&mut self, jobs: Vec<SyncJob>) -> Result<SessionOutcome> {
        let results = self.run_jobs(&jobs).await;
        let outcome = self.record(&jobs, &results);

        self.store.save(&self.watched.to_vec())?;
        debug!("state saved");

        match &outcome {
            SessionOutcome::Failed { failed, .. } => {
                error!(failed = failed.len(), "some directories failed to sync");
            }
            other => info!(outcome = %other, "session finished"),
        }

        self.notify(&outcome).await;
        Ok(outcome)
    }

    /// Run `jobs`, at most `parallel` at a time. Results are in job order.
    async fn run_jobs(&self, jobs: &[SyncJob]) -> Vec<bool> {
        let limit = self.options.parallel.max(1);
        if limit == 1 || jobs.len() <= 1 {
            let mut results = Vec::with_capacity(jobs.len());
            for job in jobs {
                results.push(run_job(self.backend.as_ref(), job).await);
            }
            return results;
        }

        let semaphore = Arc::new(Semaphore::new(limit));
        let mut set = JoinSet::new();
        for (idx, job) in jobs.iter().cloned().enumerate() {
            let backend = Arc::clone(&self.backend);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (idx, run_job(backend.as_ref(), &job).await)
            });
        }

        // A job whose task panicked keeps `false`.
        let mut results = vec![false; jobs.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, ok)) => results[idx] = ok,
                Err(e) => error!(error = %e, "sync task did not complete"),
            }
        }
        results
    }

    /// Bump timestamps of successful jobs and build the outcome.
    fn record(&mut self, jobs: &[SyncJob], results: &[bool]) -> SessionOutcome {
        let now = self.clock.now();
        let mut failed = Vec::new();
        let mut succeeded = 0;

        for (job, ok) in jobs.iter().zip(results) {
            if !*ok {
                failed.push(job.local.clone());
                continue;
            }
            succeeded += 1;
            match self.watched.get_mut(&job.local) {
                Some(entry) if entry.bucket() == job.bucket => entry.mark_synced(now),
                _ => debug!(path = %job.local.display(), "synced path is not a watched entry"),
            }
        }

        if failed.is_empty() {
            SessionOutcome::Synced { count: succeeded }
        } else {
            SessionOutcome::Failed { failed, succeeded }
        }
    }

    async fn notify(&self, outcome: &SessionOutcome) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let notification = match outcome {
            SessionOutcome::Failed { failed, .. } => Notification::failure(failed.clone()),
            _ => Notification::success(),
        };
        if let Err(e) = notifier.send(&notification).await {
            warn!(error = %e, "failed to send notification");
        }
    }
}

async fn run_job(backend: &dyn SyncBackend, job: &SyncJob) -> bool {
    match backend.run(job).await {
        Ok(ok) => ok,
        Err(e) => {
            error!(path = %job.local.display(), error = %e, "could not run synchronizer");
            false
        }
    }
}
