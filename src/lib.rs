// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod notify;
pub mod paths;
pub mod schedule;
pub mod session;
pub mod state;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::clock::SystemClock;
use crate::config::{load_config, Environment, Settings};
use crate::connectivity::HttpProbe;
use crate::exec::{SyncDirection, SyncExecutor};
use crate::notify::{Notifier, PushbulletNotifier};
use crate::paths::{posix_str, resolve_against};
use crate::session::{BackupSession, Collaborators, SessionOutcome};
use crate::state::{FileStateStore, StateStore, WatchedEntry, WatchedSet};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and command-line overrides
/// - the file-backed state store
/// - the synchronizer, connectivity probe and notifier
/// - the requested subcommand
pub async fn run(args: CliArgs) -> Result<()> {
    let env = Environment::detect()?;
    let cfg = load_config(args.config.as_deref())?;
    let settings = Settings::resolve(cfg, args.overrides.into(), &env)?;

    debug!(
        state = %settings.state_path.display(),
        prefix = %settings.prefix,
        frequency = %settings.frequency,
        notify = settings.notify,
        dry_run = settings.dry_run,
        "effective settings"
    );

    match args.command {
        Command::Ls => {
            let store = FileStateStore::new(&settings.state_path, &settings.home);
            let watched = WatchedSet::assemble(
                store.load(),
                &settings.configured,
                &settings.adhoc,
                &settings.adhoc_excludes,
                &settings.prefix,
            )?;
            for entry in &watched {
                println!("{}", format_ls_line(entry));
            }
        }
        Command::Backup => {
            let mut session = open_session(&settings)?;
            let outcome = session.backup().await?;
            print_report(&outcome, SyncDirection::Push);
        }
        Command::Restore { bucket, dest } => {
            let mut session = open_session(&settings)?;
            let outcome = match (bucket, dest) {
                (Some(bucket), Some(dest)) => {
                    let dest = resolve_against(&dest, &env.cwd, &env.home);
                    session.restore_bucket(&bucket, &dest).await?
                }
                _ => session.restore().await?,
            };
            print_report(&outcome, SyncDirection::Pull);
        }
    }

    Ok(())
}

/// Build a session with the production collaborators.
fn open_session(settings: &Settings) -> Result<BackupSession> {
    let remote = settings.require_remote()?;

    let executor = SyncExecutor::new(&settings.binary, remote).with_deadline(
        settings.sync_timeout.map(|t| t.to_std()),
        settings.kill_grace.to_std(),
    );

    let notifier: Option<Box<dyn Notifier>> = match (settings.notify, &settings.credential) {
        (true, Some(token)) => Some(Box::new(PushbulletNotifier::new(token.clone()))),
        _ => None,
    };

    let parts = Collaborators {
        store: Box::new(FileStateStore::new(&settings.state_path, &settings.home)),
        backend: Arc::new(executor),
        probe: Box::new(HttpProbe::new(settings.probe_url.clone())),
        notifier,
        clock: Arc::new(SystemClock),
    };

    info!(remote, binary = %settings.binary.display(), "opening session");
    Ok(BackupSession::open(settings, parts)?)
}

fn print_report(outcome: &SessionOutcome, direction: SyncDirection) {
    if let Some(text) = outcome.report(direction) {
        println!("{text}");
    }
}

/// One `ls` line: `<synced>\t<path>\t<bucket>`, with `never` for entries
/// that were never synced.
pub fn format_ls_line(entry: &WatchedEntry) -> String {
    let synced = match entry.last_synced() {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never".to_string(),
    };
    format!("{synced}\t{}\t{}", posix_str(entry.path()), entry.bucket())
}
