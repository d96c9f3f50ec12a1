// src/schedule/interval.rs

//! Sync-frequency interval strings such as `"1d"`, `"2d 12h"` or `"1y 30s"`.
//!
//! Grammar: whitespace-separated `<magnitude><unit>` tokens, units `y` (365
//! days), `d`, `h`, `m`, `s`, each unit at most once.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::TimeDelta;
use regex::Regex;

use crate::errors::BackwatchError;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<mag>[0-9]+)(?P<unit>[A-Za-z]+)$").expect("static interval token regex")
});

const UNITS: [(char, i64); 5] = [
    ('y', 365 * 24 * 60 * 60),
    ('d', 24 * 60 * 60),
    ('h', 60 * 60),
    ('m', 60),
    ('s', 1),
];

/// A non-negative interval with second granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(TimeDelta);

impl Interval {
    pub fn from_secs(secs: u32) -> Self {
        Interval(TimeDelta::seconds(i64::from(secs)))
    }

    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }

    pub fn to_std(&self) -> Duration {
        self.0.to_std().unwrap_or(Duration::ZERO)
    }
}

impl FromStr for Interval {
    type Err = BackwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BackwatchError::config("empty interval string"));
        }

        let mut seen: Vec<char> = Vec::new();
        let mut total_secs: i64 = 0;

        for token in trimmed.split_whitespace() {
            let caps = TOKEN_RE.captures(token).ok_or_else(|| {
                BackwatchError::config(format!(
                    "malformed interval token '{token}' in '{s}' (expected <number><y|d|h|m|s>)"
                ))
            })?;

            let unit_str = &caps["unit"];
            let (unit, secs_per_unit) = UNITS
                .iter()
                .copied()
                .find(|(u, _)| unit_str.len() == 1 && unit_str.starts_with(*u))
                .ok_or_else(|| {
                    BackwatchError::config(format!(
                        "unknown interval unit '{unit_str}' in '{s}' (expected y, d, h, m or s)"
                    ))
                })?;

            if seen.contains(&unit) {
                return Err(BackwatchError::config(format!(
                    "interval unit '{unit}' appears more than once in '{s}'"
                )));
            }
            seen.push(unit);

            let magnitude: i64 = caps["mag"].parse().map_err(|e| {
                BackwatchError::config(format!("invalid magnitude in '{token}': {e}"))
            })?;

            total_secs = magnitude
                .checked_mul(secs_per_unit)
                .and_then(|secs| total_secs.checked_add(secs))
                .ok_or_else(|| BackwatchError::config(format!("interval '{s}' is too large")))?;
        }

        TimeDelta::try_seconds(total_secs)
            .map(Interval)
            .ok_or_else(|| BackwatchError::config(format!("interval '{s}' is too large")))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut remaining = self.0.num_seconds();
        if remaining == 0 {
            return write!(f, "0s");
        }

        let mut first = true;
        for (unit, secs_per_unit) in UNITS {
            let count = remaining / secs_per_unit;
            if count > 0 {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{count}{unit}")?;
                remaining -= count * secs_per_unit;
                first = false;
            }
        }
        Ok(())
    }
}
