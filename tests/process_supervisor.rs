// tests/process_supervisor.rs

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout, TestResult};

use std::path::Path;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use backwatch::errors::BackwatchError;
use backwatch::exec::{ExitHooks, ProcessSpec, SupervisedProcess, SyncExecutor};

fn sh(script: &str) -> ProcessSpec {
    ProcessSpec::new("sh").arg("-c").arg(script)
}

#[derive(Clone, Default)]
struct HookLog {
    exits: Arc<AtomicUsize>,
    errors: Arc<AtomicUsize>,
    last_code: Arc<AtomicI32>,
}

impl HookLog {
    fn hooks(&self) -> ExitHooks {
        let exits = Arc::clone(&self.exits);
        let errors = Arc::clone(&self.errors);
        let last_code = Arc::clone(&self.last_code);
        ExitHooks::new()
            .on_exit(move |code| {
                exits.fetch_add(1, Ordering::SeqCst);
                last_code.store(code, Ordering::SeqCst);
            })
            .on_error(move |_| {
                errors.fetch_add(1, Ordering::SeqCst);
            })
    }
}

#[tokio::test]
async fn successful_exit_runs_only_on_exit() -> TestResult {
    init_tracing();
    let log = HookLog::default();

    let proc = SupervisedProcess::launch(&ProcessSpec::new("true"), log.hooks())?;
    let code = with_timeout(proc.wait()).await?;

    assert_eq!(code, 0);
    assert_eq!(proc.status(), Some(0));
    assert_eq!(log.exits.load(Ordering::SeqCst), 1);
    assert_eq!(log.errors.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn nonzero_exit_runs_both_hooks_once() -> TestResult {
    init_tracing();
    let log = HookLog::default();

    let proc = SupervisedProcess::launch(&sh("exit 3"), log.hooks())?;
    let code = with_timeout(proc.wait()).await?;

    assert_eq!(code, 3);
    assert_eq!(log.exits.load(Ordering::SeqCst), 1);
    assert_eq!(log.errors.load(Ordering::SeqCst), 1);
    assert_eq!(log.last_code.load(Ordering::SeqCst), 3);

    // Waiting again returns the same code without re-running hooks.
    assert_eq!(with_timeout(proc.wait()).await?, 3);
    assert_eq!(log.exits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn missing_binary_fails_at_launch() {
    init_tracing();
    let spec = ProcessSpec::new("/nonexistent/definitely-not-a-binary");

    match SupervisedProcess::launch(&spec, ExitHooks::new()) {
        Err(BackwatchError::LaunchError { program, .. }) => {
            assert!(program.contains("definitely-not-a-binary"));
        }
        other => panic!("expected LaunchError, got {other:?}"),
    }
}

#[tokio::test]
async fn wait_right_after_launch_blocks_until_exit() -> TestResult {
    init_tracing();
    let started = Instant::now();

    let proc = SupervisedProcess::launch(&sh("sleep 0.3; exit 0"), ExitHooks::new())?;
    assert!(proc.pid().is_some());
    let code = with_timeout(proc.wait()).await?;

    assert_eq!(code, 0);
    assert!(started.elapsed() >= Duration::from_millis(250));
    Ok(())
}

#[tokio::test]
async fn status_is_none_while_running_and_kill_stops_it() -> TestResult {
    init_tracing();
    let log = HookLog::default();

    let proc = SupervisedProcess::launch(&ProcessSpec::new("sleep").arg("30"), log.hooks())?;
    assert_eq!(proc.status(), None);

    proc.kill();
    let code = with_timeout(proc.wait()).await?;

    assert_eq!(code, -1);
    assert_eq!(log.errors.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn terminate_stops_a_cooperative_process() -> TestResult {
    init_tracing();

    let proc = SupervisedProcess::launch(&ProcessSpec::new("sleep").arg("30"), ExitHooks::new())?;
    proc.terminate();

    assert_eq!(with_timeout(proc.wait()).await?, -1);
    Ok(())
}

#[tokio::test]
async fn signals_after_exit_are_ignored() -> TestResult {
    init_tracing();

    let proc = SupervisedProcess::launch(&ProcessSpec::new("true"), ExitHooks::new())?;
    with_timeout(proc.wait()).await?;

    proc.terminate();
    proc.kill();
    assert_eq!(proc.status(), Some(0));
    Ok(())
}

#[tokio::test]
async fn deadline_terminates_a_hung_process() -> TestResult {
    init_tracing();
    let started = Instant::now();

    let proc = SupervisedProcess::launch(&ProcessSpec::new("sleep").arg("30"), ExitHooks::new())?;
    let code = with_timeout(
        proc.wait_with_deadline(Duration::from_millis(100), Duration::from_secs(2)),
    )
    .await?;

    assert_eq!(code, -1);
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn deadline_kills_a_process_ignoring_terminate() -> TestResult {
    init_tracing();

    let proc = SupervisedProcess::launch(&sh("trap '' TERM; while :; do sleep 0.05; done"), ExitHooks::new())?;
    let code = with_timeout(
        proc.wait_with_deadline(Duration::from_millis(100), Duration::from_millis(200)),
    )
    .await?;

    assert_eq!(code, -1);
    Ok(())
}

#[tokio::test]
async fn deadline_not_reached_returns_real_code() -> TestResult {
    init_tracing();

    let proc = SupervisedProcess::launch(&sh("exit 7"), ExitHooks::new())?;
    let code = with_timeout(
        proc.wait_with_deadline(Duration::from_secs(3), Duration::from_secs(1)),
    )
    .await?;

    assert_eq!(code, 7);
    Ok(())
}

#[tokio::test]
async fn executor_maps_exit_codes_to_success() -> TestResult {
    init_tracing();
    let docs = Path::new("/home/u/docs");

    let ok = SyncExecutor::new("true", "remote");
    assert!(with_timeout(ok.push(docs, "p-docs", &[], false)).await?);
    assert!(with_timeout(ok.pull("p-docs", docs, &["*.tmp".to_string()], true)).await?);

    let failing = SyncExecutor::new("false", "remote");
    assert!(!with_timeout(failing.push(docs, "p-docs", &[], false)).await?);
    Ok(())
}

#[tokio::test]
async fn executor_reports_missing_binary_as_launch_error() {
    init_tracing();
    let exec = SyncExecutor::new("/nonexistent/rclone", "remote");

    let res = with_timeout(exec.push(Path::new("/tmp"), "p-tmp", &[], false)).await;
    assert!(matches!(res, Err(BackwatchError::LaunchError { .. })));
}
