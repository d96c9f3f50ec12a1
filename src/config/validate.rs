// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile, WatchedSpec};
use crate::errors::{BackwatchError, Result};
use crate::schedule::Interval;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BackwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let frequency = parse_interval_field("frequency", &raw.frequency)?;
        let kill_grace = parse_interval_field("kill_grace", &raw.kill_grace)?;
        let sync_timeout = raw
            .sync_timeout
            .as_deref()
            .map(|s| parse_interval_field("sync_timeout", s))
            .transpose()?;

        Ok(ConfigFile {
            remote: raw.remote,
            watched: raw.watched,
            exclude: raw.exclude,
            prefix: raw.prefix,
            frequency,
            notify: raw.notify,
            pushbullet: raw.pushbullet,
            state_path: raw.state_path,
            binary: raw.binary,
            sync_timeout,
            kill_grace,
            parallel: raw.parallel,
            probe_url: raw.probe_url,
        })
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_scalars(cfg)?;
    validate_exclude_patterns(&cfg.exclude)?;
    validate_watched(&cfg.watched)?;
    Ok(())
}

fn validate_scalars(cfg: &RawConfigFile) -> Result<()> {
    if let Some(remote) = &cfg.remote {
        if remote.trim().is_empty() {
            return Err(BackwatchError::config("`remote` must not be empty"));
        }
    }

    if let Some(prefix) = &cfg.prefix {
        validate_prefix(prefix)?;
    }

    if cfg.binary.trim().is_empty() {
        return Err(BackwatchError::config("`binary` must not be empty"));
    }

    if cfg.parallel == 0 {
        return Err(BackwatchError::config("`parallel` must be >= 1 (got 0)"));
    }

    Ok(())
}

fn validate_watched(watched: &[WatchedSpec]) -> Result<()> {
    for spec in watched {
        if spec.path().as_os_str().is_empty() {
            return Err(BackwatchError::config("`watched` contains an empty path"));
        }
        if let WatchedSpec::Detailed {
            path,
            bucket,
            exclude,
        } = spec
        {
            if let Some(bucket) = bucket {
                if bucket.trim().is_empty() {
                    return Err(BackwatchError::config(format!(
                        "watched entry {:?} has an empty `bucket`",
                        path
                    )));
                }
            }
            if let Some(exclude) = exclude {
                validate_exclude_patterns(exclude)?;
            }
        }
    }
    Ok(())
}

/// Reject a prefix that could not form part of a bucket name.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.trim().is_empty() {
        return Err(BackwatchError::config("`prefix` must not be empty"));
    }
    if prefix.contains(['/', ':']) {
        return Err(BackwatchError::config(format!(
            "`prefix` '{prefix}' must not contain '/' or ':'"
        )));
    }
    Ok(())
}

/// Every exclude pattern must be a valid glob.
pub fn validate_exclude_patterns(patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        Glob::new(pattern).map_err(|e| {
            BackwatchError::config(format!("invalid exclude pattern '{pattern}': {e}"))
        })?;
    }
    Ok(())
}

/// Parse an interval, naming the offending key in the error.
pub fn parse_interval_field(field: &str, value: &str) -> Result<Interval> {
    value.parse::<Interval>().map_err(|e| match e {
        BackwatchError::ConfigError(msg) => BackwatchError::config(format!("`{field}`: {msg}")),
        other => other,
    })
}
