pub mod builders;
pub mod fake_backend;
pub mod fakes;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

pub use backwatch::state::MemoryStateStore;
pub use builders::{EntryBuilder, SettingsBuilder};
pub use fake_backend::FakeSyncBackend;
pub use fakes::{FakeProbe, FixedClock, RecordingNotifier, SessionHarness};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Fail the test if `fut` does not finish within five seconds.
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("test timed out")
}
