// src/exec/backend.rs

//! Pluggable sync backend abstraction.
//!
//! The session talks to a `SyncBackend` instead of the executor directly, so
//! tests can script outcomes without spawning processes. Production code uses
//! [`SyncExecutor`].

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::exec::sync::{SyncExecutor, SyncJob};

/// Trait abstracting how a sync job is carried out.
pub trait SyncBackend: Send + Sync {
    /// Run `job` to completion.
    ///
    /// `Ok(true)` on success, `Ok(false)` when the synchronizer ran and
    /// failed, `Err` when it could not be launched.
    fn run<'a>(
        &'a self,
        job: &'a SyncJob,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;
}

impl SyncBackend for SyncExecutor {
    fn run<'a>(
        &'a self,
        job: &'a SyncJob,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(self.execute(job))
    }
}
