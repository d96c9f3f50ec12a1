// src/session/outcome.rs

use std::fmt;
use std::path::PathBuf;

use crate::exec::SyncDirection;
use crate::paths::posix_str;

/// How a backup or restore session ended.
///
/// Only configuration and state-save problems are errors; every variant here
/// is a normal, exit-0 result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The connectivity probe failed; nothing was attempted.
    Offline,
    NoWatched,
    /// Nothing was due; state was not touched.
    UpToDate,
    Synced { count: usize },
    /// At least one job failed. Paths are in job order.
    Failed { failed: Vec<PathBuf>, succeeded: usize },
}

impl SessionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionOutcome::Failed { .. })
    }

    /// Paths whose sync failed, if any.
    pub fn failed_paths(&self) -> &[PathBuf] {
        match self {
            SessionOutcome::Failed { failed, .. } => failed,
            _ => &[],
        }
    }

    /// Text shown to the user on stdout. Success is silent.
    pub fn report(&self, direction: SyncDirection) -> Option<String> {
        match self {
            SessionOutcome::Offline => Some(match direction {
                SyncDirection::Push => "No internet connection detected, delaying backup.".into(),
                SyncDirection::Pull => "No internet connection detected, can not restore.".into(),
            }),
            SessionOutcome::NoWatched => Some("No watched directories".into()),
            SessionOutcome::UpToDate => Some("Up to date!".into()),
            SessionOutcome::Synced { .. } => None,
            SessionOutcome::Failed { failed, .. } => {
                let mut text = String::from("Some directories failed to sync!");
                for path in failed {
                    text.push_str("\n  ");
                    text.push_str(&posix_str(path));
                }
                Some(text)
            }
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Offline => write!(f, "offline"),
            SessionOutcome::NoWatched => write!(f, "no watched directories"),
            SessionOutcome::UpToDate => write!(f, "up to date"),
            SessionOutcome::Synced { count } => write!(f, "synced {count} directories"),
            SessionOutcome::Failed { failed, succeeded } => write!(
                f,
                "{} failed, {succeeded} succeeded",
                failed.len()
            ),
        }
    }
}
