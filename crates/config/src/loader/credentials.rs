//! `GOOGLE_APPLICATION_CREDENTIALS` normalization.
//!
//! Responsibilities:
//! - Detect placeholder values copied from example `.env` files.
//! - Resolve a configured key path against the module root.
//! - Discover a key file in `credentials/` directories when none is configured.
//!
//! Invariants:
//! - An existing absolute path is returned exactly as configured.
//! - Relative paths are resolved against the module root, never the working directory.
//! - Discovery only considers regular files named `*.json`, sorted by file name.
//!
//! Placeholder detection is a substring heuristic. A real key file whose path
//! happens to contain `your-` is treated as unset.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::{CREDENTIALS_FILE_EXTENSION, PLACEHOLDER_MARKERS, PLACEHOLDER_PREFIX};
use crate::paths::{absolutize, expand_home};

/// True if `value` is blank or looks like a template value
/// (e.g. `/path/to/your-service-account.json`).
pub fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    if v.is_empty() {
        return true;
    }
    PLACEHOLDER_MARKERS.iter().any(|marker| v.contains(marker))
        || v.to_lowercase().contains(PLACEHOLDER_PREFIX)
}

/// Resolve the configured credentials value to an existing file.
///
/// Returns `None` for missing, placeholder, or dangling values.
pub(crate) fn normalize_credentials_path(
    raw: Option<&str>,
    module_root: &Path,
    home: Option<&Path>,
) -> Option<PathBuf> {
    let value = raw?.trim();
    if is_placeholder(value) {
        debug!("credentials path is blank or a placeholder; treating as unset");
        return None;
    }

    let expanded = expand_home(value, home);
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        absolutize(&module_root.join(expanded))
    };

    if resolved.is_file() {
        Some(resolved)
    } else {
        debug!(path = %resolved.display(), "configured credentials file does not exist");
        None
    }
}

/// First `*.json` key file found in `dirs`, searched in order.
pub(crate) fn discover_credentials(dirs: &[PathBuf]) -> Option<PathBuf> {
    for dir in dirs {
        let candidates = json_candidates(dir);
        if candidates.len() > 1 {
            warn!(
                dir = %dir.display(),
                count = candidates.len(),
                "multiple credential files found; using the first by file name"
            );
        }
        if let Some(first) = candidates.into_iter().next() {
            debug!(path = %first.display(), "discovered credentials file");
            return Some(absolutize(&first));
        }
    }
    None
}

fn json_candidates(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let suffix = format!(".{CREDENTIALS_FILE_EXTENSION}");
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(&suffix))
                && path.is_file()
        })
        .collect();
    files.sort();
    files
}
