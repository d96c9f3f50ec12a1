// src/paths.rs

//! Path resolution for watched directories and config/state files.

use std::path::{Component, Path, PathBuf};

use crate::errors::{BackwatchError, Result};

/// Home directory of the invoking user.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| BackwatchError::config("could not determine the home directory"))
}

/// Expand a leading `~` and anchor relative paths at `base`.
///
/// The result is lexically normalised (`.` and `..` removed) but symlinks
/// are left alone, so the directory does not have to exist yet.
pub fn resolve_against(path: &Path, base: &Path, home: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    };

    if expanded.is_absolute() {
        normalize(&expanded)
    } else {
        normalize(&base.join(expanded))
    }
}

/// Remove `.` and resolve `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Exact string form of a path, as written to the state file.
///
/// Non-UTF-8 paths are rejected; storing them lossily would change their identity.
pub fn exact_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        BackwatchError::StateError(format!("path is not valid UTF-8: {}", path.display()))
    })
}

/// Display form with `/` separators, used in listings and notifications.
#[cfg(unix)]
pub fn posix_str(path: &Path) -> String {
    // A backslash is an ordinary filename byte here.
    path.to_string_lossy().into_owned()
}

#[cfg(not(unix))]
pub fn posix_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
