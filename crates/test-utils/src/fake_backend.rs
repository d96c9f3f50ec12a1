use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use backwatch::errors::{BackwatchError, Result};
use backwatch::exec::{SyncBackend, SyncJob};

#[derive(Default)]
struct BackendState {
    jobs: Vec<SyncJob>,
    failing: HashSet<PathBuf>,
    unlaunchable: HashSet<PathBuf>,
    delay: Option<Duration>,
    in_flight: usize,
    max_in_flight: usize,
}

/// A fake sync backend that:
/// - records every job it is asked to run
/// - succeeds unless the job's local path was scripted to fail
/// - can pretend the synchronizer binary is missing for a path.
#[derive(Clone, Default)]
pub struct FakeSyncBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeSyncBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs for `path` exit non-zero.
    pub fn fail_on(self, path: impl AsRef<Path>) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(path.as_ref().to_path_buf());
        self
    }

    /// Jobs for `path` cannot be launched.
    pub fn launch_error_on(self, path: impl AsRef<Path>) -> Self {
        self.state
            .lock()
            .unwrap()
            .unlaunchable
            .insert(path.as_ref().to_path_buf());
        self
    }

    /// Every job sleeps this long before finishing.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn jobs(&self) -> Vec<SyncJob> {
        self.state.lock().unwrap().jobs.clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.state.lock().unwrap().jobs.len()
    }

    /// Local paths of recorded jobs, in the order they started.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.jobs().into_iter().map(|j| j.local).collect()
    }

    /// Highest number of jobs that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }
}

impl SyncBackend for FakeSyncBackend {
    fn run<'a>(
        &'a self,
        job: &'a SyncJob,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        let state = Arc::clone(&self.state);

        Box::pin(async move {
            let (delay, failing, unlaunchable) = {
                let mut guard = state.lock().unwrap();
                guard.jobs.push(job.clone());
                guard.in_flight += 1;
                guard.max_in_flight = guard.max_in_flight.max(guard.in_flight);
                (
                    guard.delay,
                    guard.failing.contains(&job.local),
                    guard.unlaunchable.contains(&job.local),
                )
            };

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            state.lock().unwrap().in_flight -= 1;

            if unlaunchable {
                return Err(BackwatchError::LaunchError {
                    program: "fake-sync".to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such binary"),
                });
            }
            Ok(!failing)
        })
    }
}
