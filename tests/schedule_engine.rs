// tests/schedule_engine.rs

mod common;
use crate::common::builders::EntryBuilder;
use crate::common::{noon, TestResult};

use chrono::{DateTime, TimeDelta, Utc};
use proptest::prelude::*;

use backwatch::schedule::{Interval, ScheduleEngine};
use backwatch::state::{WatchedEntry, WatchedSet};

fn engine(freq: &str) -> ScheduleEngine {
    ScheduleEngine::new(freq.parse().expect("valid interval"))
}

fn entry_synced(path: &str, at: DateTime<Utc>) -> WatchedEntry {
    EntryBuilder::new(path, "bucket").synced(at).build()
}

#[test]
fn exactly_equal_age_is_not_due() {
    let now = noon();
    let e = entry_synced("/a", now - TimeDelta::days(1));
    assert!(!engine("1d").is_due(&e, now));
}

#[test]
fn one_second_past_the_frequency_is_due() {
    let now = noon();
    let e = entry_synced("/a", now - TimeDelta::days(1) - TimeDelta::seconds(1));
    assert!(engine("1d").is_due(&e, now));
}

#[test]
fn never_synced_is_always_due() {
    let e = WatchedEntry::new("/a", "bucket");
    assert!(engine("100y").is_due(&e, noon()));
}

#[test]
fn future_timestamp_is_not_due() {
    let now = noon();
    let e = entry_synced("/a", now + TimeDelta::hours(3));
    assert!(!engine("0s").is_due(&e, now));
}

#[test]
fn forty_hours_against_one_day_then_synced() -> TestResult {
    let now = noon();
    let mut set = WatchedSet::from_entries([entry_synced("/a", now - TimeDelta::hours(40))]);
    let engine = engine("1d");

    let due: Vec<_> = engine.due(&set, now).map(|e| e.path().to_path_buf()).collect();
    assert_eq!(due, vec![std::path::PathBuf::from("/a")]);

    set.get_mut(std::path::Path::new("/a"))
        .ok_or("entry missing")?
        .mark_synced(now);

    assert_eq!(engine.due(&set, now).count(), 0);
    Ok(())
}

#[test]
fn due_only_yields_stale_entries_in_path_order() {
    let now = noon();
    let set = WatchedSet::from_entries([
        entry_synced("/c", now - TimeDelta::hours(30)),
        entry_synced("/b", now - TimeDelta::hours(2)),
        WatchedEntry::new("/a", "bucket"),
    ]);

    let due: Vec<_> = engine("1d")
        .due(&set, now)
        .map(|e| e.path().display().to_string())
        .collect();
    assert_eq!(due, vec!["/a", "/c"]);
}

#[test]
fn due_is_recomputed_on_every_call() {
    let now = noon();
    let set = WatchedSet::from_entries([entry_synced("/a", now - TimeDelta::hours(12))]);
    let engine = engine("1d");

    assert_eq!(engine.due(&set, now).count(), 0);
    assert_eq!(engine.due(&set, now + TimeDelta::hours(13)).count(), 1);
}

#[test]
fn frequency_is_exposed() {
    assert_eq!(engine("2h").frequency(), Interval::from_secs(7_200));
}

proptest! {
    #[test]
    fn due_iff_age_strictly_exceeds_frequency(
        age_secs in -1_000_000i64..10_000_000,
        freq_secs in 0u32..5_000_000,
    ) {
        let now = noon();
        let e = entry_synced("/p", now - TimeDelta::seconds(age_secs));
        let engine = ScheduleEngine::new(Interval::from_secs(freq_secs));
        prop_assert_eq!(engine.is_due(&e, now), age_secs > i64::from(freq_secs));
    }
}
