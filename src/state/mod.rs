// src/state/mod.rs

//! Watched entries and their persistence.
//!
//! - [`entry`] defines [`WatchedEntry`] and bucket naming.
//! - [`watched`] merges persisted, configured and ad-hoc entries.
//! - [`codec`] is the versioned state-file schema.
//! - [`store`] provides the [`StateStore`] trait with file and memory backends.

pub mod codec;
pub mod entry;
pub mod store;
pub mod watched;

pub use entry::{current_username, default_prefix, derive_bucket, WatchedEntry};
pub use store::{FileStateStore, MemoryStateStore, StateStore};
pub use watched::{ConfiguredEntry, WatchedSet};
