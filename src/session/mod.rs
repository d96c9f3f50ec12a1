// src/session/mod.rs

//! One invocation of backup or restore.
//!
//! [`BackupSession`] owns the watched set for the duration of a run and talks
//! to the outside world only through trait objects: state store, sync backend,
//! connectivity probe, notifier and clock.

pub mod backup;
pub mod outcome;

pub use backup::{BackupSession, Collaborators, SessionOptions};
pub use outcome::SessionOutcome;
