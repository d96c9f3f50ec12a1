// tests/cli_args.rs

use std::path::PathBuf;

use clap::Parser;

use backwatch::cli::{CliArgs, Command};
use backwatch::config::Overrides;

#[test]
fn backup_with_global_options() {
    let args = CliArgs::try_parse_from([
        "backwatch", "-r", "b2", "-w", "src", "-w", "docs", "-x", "*.o", "-f", "6h", "--dry-run",
        "backup",
    ])
    .expect("valid args");

    assert!(matches!(args.command, Command::Backup));
    let overrides: Overrides = args.overrides.into();
    assert_eq!(overrides.remote.as_deref(), Some("b2"));
    assert_eq!(overrides.watched, vec![PathBuf::from("src"), PathBuf::from("docs")]);
    assert_eq!(overrides.exclude, vec!["*.o".to_string()]);
    assert_eq!(overrides.frequency.as_deref(), Some("6h"));
    assert!(overrides.dry_run);
    assert!(!overrides.notify);
}

#[test]
fn global_options_may_follow_the_subcommand() {
    let args = CliArgs::try_parse_from(["backwatch", "ls", "--state", "/tmp/s", "-p", "mine"])
        .expect("valid args");

    assert!(matches!(args.command, Command::Ls));
    assert_eq!(args.overrides.state_path, Some(PathBuf::from("/tmp/s")));
    assert_eq!(args.overrides.prefix.as_deref(), Some("mine"));
}

#[test]
fn restore_bucket_requires_dest() {
    assert!(CliArgs::try_parse_from(["backwatch", "restore", "--bucket", "b"]).is_err());
    assert!(CliArgs::try_parse_from(["backwatch", "restore", "--dest", "/x"]).is_err());

    let args = CliArgs::try_parse_from(["backwatch", "restore", "-b", "b", "-d", "/x"])
        .expect("valid args");
    match args.command {
        Command::Restore { bucket, dest } => {
            assert_eq!(bucket.as_deref(), Some("b"));
            assert_eq!(dest, Some(PathBuf::from("/x")));
        }
        other => panic!("expected restore, got {other:?}"),
    }
}

#[test]
fn plain_restore_and_config_path() {
    let args = CliArgs::try_parse_from(["backwatch", "--config", "/etc/bw.toml", "-n", "restore"])
        .expect("valid args");

    assert!(matches!(args.command, Command::Restore { bucket: None, dest: None }));
    assert_eq!(args.config, Some(PathBuf::from("/etc/bw.toml")));
    assert!(args.overrides.notify);
}

#[test]
fn a_subcommand_is_required() {
    assert!(CliArgs::try_parse_from(["backwatch"]).is_err());
}
