// src/state/codec.rs

//! On-disk schema for the state file.
//!
//! Version 1 is a TOML document:
//!
//! ```toml
//! version = 1
//!
//! [[entry]]
//! path = "/home/u/docs"
//! bucket = "abc123-docs"
//! synced = "2024-03-01T12:00:00.000000000Z"
//! exclude = ["*.tmp"]   # optional
//! ```
//!
//! `synced` is UTC in a fixed-width format, so lexical order is time order.
//! Entries that never synced carry [`NEVER_SYNCED`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::paths::{exact_str, resolve_against};
use crate::state::WatchedEntry;

pub const SCHEMA_VERSION: u32 = 1;

/// Format used when writing `synced`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";

/// Marker written for entries without a successful sync.
pub const NEVER_SYNCED: &str = "0001-01-01T00:00:00.000000000Z";

const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    #[serde(default, rename = "entry")]
    entries: Vec<StateRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    path: String,
    bucket: String,
    synced: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exclude: Vec<String>,
}

pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        None => NEVER_SYNCED.to_string(),
    }
}

pub fn parse_timestamp(s: &str) -> std::result::Result<Option<DateTime<Utc>>, chrono::ParseError> {
    let s = s.trim();
    if s == NEVER_SYNCED {
        return Ok(None);
    }
    let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_PARSE_FORMAT)?;
    Ok(Some(naive.and_utc()))
}

/// Serialise entries into a version-1 document.
///
/// Paths are written byte for byte; a non-UTF-8 path is a `StateError`.
pub fn encode(entries: &[WatchedEntry]) -> Result<String> {
    let records = entries
        .iter()
        .map(|e| {
            Ok(StateRecord {
                path: exact_str(e.path())?.to_string(),
                bucket: e.bucket().to_string(),
                synced: format_timestamp(e.last_synced()),
                exclude: e.excludes().to_vec(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let doc = StateDocument {
        version: SCHEMA_VERSION,
        entries: records,
    };
    Ok(toml::to_string(&doc)?)
}

/// Parse a state document.
///
/// Relative paths are anchored at `home`. Any problem is reported as a
/// message; the caller decides how to recover.
pub fn decode(text: &str, home: &Path) -> std::result::Result<Vec<WatchedEntry>, String> {
    let doc: StateDocument = toml::from_str(text).map_err(|e| e.to_string())?;

    if doc.version != SCHEMA_VERSION {
        return Err(format!(
            "unsupported state schema version {} (expected {})",
            doc.version, SCHEMA_VERSION
        ));
    }

    doc.entries
        .into_iter()
        .map(|record| {
            let synced = parse_timestamp(&record.synced)
                .map_err(|e| format!("bad timestamp '{}' for {}: {e}", record.synced, record.path))?;
            let path = resolve_against(&PathBuf::from(&record.path), home, home);
            Ok(WatchedEntry::new(path, record.bucket)
                .with_last_synced(synced)
                .with_excludes(record.exclude))
        })
        .collect()
}
