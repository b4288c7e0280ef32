//! Path helpers for the Mobius repository layout.
//!
//! Responsibilities:
//! - Locate the repository root and the global configuration directory.
//! - Expand `~` using the `directories` crate.
//! - Locate the gcloud application default credentials file.
//!
//! Does NOT handle:
//! - Reading any file (see the loader).

use std::path::{Path, PathBuf};

use crate::constants::{ADC_FILE_NAME, GLOBAL_CONFIG_DIR_NAME};

/// Returns the current user's home directory, if the platform reports one.
pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Returns the global configuration directory for a module: `<module_root>/../mobius-config`.
///
/// A module root without a parent (the filesystem root) uses itself as the parent.
pub fn global_config_dir(module_root: &Path) -> PathBuf {
    module_root
        .parent()
        .unwrap_or(module_root)
        .join(GLOBAL_CONFIG_DIR_NAME)
}

/// Walk up from `start` looking for a directory that contains `mobius-config`.
///
/// Returns `None` when no ancestor qualifies.
pub fn discover_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(GLOBAL_CONFIG_DIR_NAME).is_dir())
        .map(Path::to_path_buf)
}

/// Expand a leading `~` or `~/` against `home`.
///
/// Values that do not start with `~`, or that use the `~user` form, are returned unchanged.
pub fn expand_home(value: &str, home: Option<&Path>) -> PathBuf {
    match (value, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (v, Some(home)) if v.starts_with("~/") => home.join(&v[2..]),
        (v, _) => PathBuf::from(v),
    }
}

/// Location of the gcloud application default credentials file.
///
/// `CLOUDSDK_CONFIG` (passed in as `cloudsdk_config`) wins; otherwise
/// `~/.config/gcloud` is used on every platform, matching the gcloud CLI.
pub fn gcloud_adc_path(cloudsdk_config: Option<&str>, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = cloudsdk_config.map(str::trim).filter(|d| !d.is_empty()) {
        return Some(expand_home(dir, home).join(ADC_FILE_NAME));
    }
    home.map(|h| h.join(".config").join("gcloud").join(ADC_FILE_NAME))
}

/// Make `path` absolute without requiring it to exist.
///
/// Existing paths are canonicalized (symlinks and `..` resolved); missing
/// ones are joined to the current directory.
pub fn absolutize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
