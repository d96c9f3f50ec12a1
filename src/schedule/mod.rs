// src/schedule/mod.rs

//! Staleness scheduling.
//!
//! - [`interval`] parses frequency strings like `"2d 12h"`.
//! - [`engine`] classifies watched entries as due or current.

pub mod engine;
pub mod interval;

pub use engine::ScheduleEngine;
pub use interval::Interval;
