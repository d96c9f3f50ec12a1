// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Overrides;

/// Command-line arguments for `backwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "backwatch",
    version,
    about = "Keep watched directories backed up to remote buckets.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `~/.backwatch.toml`, if it exists.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BACKWATCH_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// Options that override the config file for this run.
#[derive(Debug, Clone, Default, Args)]
pub struct OverrideArgs {
    /// Synchronizer remote name.
    #[arg(short, long, global = true, value_name = "REMOTE")]
    pub remote: Option<String>,

    /// Extra directory to watch for this run (repeatable).
    #[arg(short, long, global = true, value_name = "DIR")]
    pub watched: Vec<PathBuf>,

    /// Exclude pattern for the `--watched` directories (repeatable).
    #[arg(short = 'x', long, global = true, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Bucket name prefix.
    #[arg(short, long, global = true)]
    pub prefix: Option<String>,

    /// Sync frequency, e.g. "1d" or "2d 12h".
    #[arg(short, long, global = true, value_name = "INTERVAL")]
    pub frequency: Option<String>,

    /// Send a notification when the run finishes.
    #[arg(short, long, global = true)]
    pub notify: bool,

    /// Pass `--dry-run` to the synchronizer.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// State file location.
    #[arg(long = "state", global = true, value_name = "PATH")]
    pub state_path: Option<PathBuf>,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Overrides {
            remote: args.remote,
            watched: args.watched,
            exclude: args.exclude,
            prefix: args.prefix,
            frequency: args.frequency,
            notify: args.notify,
            dry_run: args.dry_run,
            state_path: args.state_path,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Push every directory whose last sync is older than the frequency.
    Backup,

    /// Pull watched directories back from their buckets.
    Restore {
        /// Restore only this bucket.
        #[arg(short, long, requires = "dest")]
        bucket: Option<String>,

        /// Destination directory for `--bucket`.
        #[arg(short, long, requires = "bucket")]
        dest: Option<PathBuf>,
    },

    /// List watched directories and their last sync time.
    Ls,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
