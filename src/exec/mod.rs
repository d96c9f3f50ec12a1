// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`supervisor`] launches an external command on a background Tokio task
//!   and tracks its lifecycle (wait, poll, terminate, kill, exit hooks).
//! - [`sync`] builds synchronizer invocations for push/pull and interprets
//!   their exit codes.
//! - [`backend`] provides the `SyncBackend` trait the session depends on, so
//!   tests can swap in a fake.

pub mod backend;
pub mod supervisor;
pub mod sync;

pub use backend::SyncBackend;
pub use supervisor::{ExitHooks, ProcessSpec, SupervisedProcess};
pub use sync::{merge_excludes, SyncDirection, SyncExecutor, SyncJob};
