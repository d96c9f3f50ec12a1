#![allow(dead_code)]

use std::error::Error;

use chrono::{DateTime, TimeZone, Utc};

pub use backwatch_test_utils::builders;
pub use backwatch_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;

/// 2024-03-01 12:00:00 UTC, the "now" of most tests.
pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}
