// src/schedule/engine.rs

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::schedule::Interval;
use crate::state::WatchedEntry;

/// Decides which watched entries are stale relative to a sync frequency.
///
/// An entry is due when `now - last_synced > frequency`, strictly. Entries
/// that were never synced are always due. There is no jitter or backoff.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleEngine {
    frequency: Interval,
}

impl ScheduleEngine {
    pub fn new(frequency: Interval) -> Self {
        Self { frequency }
    }

    pub fn frequency(&self) -> Interval {
        self.frequency
    }

    pub fn is_due(&self, entry: &WatchedEntry, now: DateTime<Utc>) -> bool {
        match entry.last_synced() {
            None => true,
            Some(synced) => now.signed_duration_since(synced) > self.frequency.as_delta(),
        }
    }

    /// Lazily yield the due subset of `entries`.
    ///
    /// Nothing is cached: calling this again after timestamps changed
    /// reflects the new state.
    pub fn due<'a, I>(
        &self,
        entries: I,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a WatchedEntry> + use<'a, I>
    where
        I: IntoIterator<Item = &'a WatchedEntry>,
        I::IntoIter: 'a,
    {
        let engine = *self;
        entries.into_iter().filter(move |entry| {
            let due = engine.is_due(entry, now);
            debug!(
                path = %entry.path().display(),
                due,
                frequency = %engine.frequency,
                "schedule check"
            );
            due
        })
    }
}
