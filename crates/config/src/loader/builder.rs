//! Builder that layers `.env` files over the ambient environment.
//!
//! Responsibilities:
//! - Snapshot the ambient environment (or take an injected one).
//! - Apply the module `.env` with override, then the global `.env` without override.
//! - Normalize the credentials path and run discovery.
//!
//! Does NOT handle:
//! - Accessor semantics (see env.rs).
//! - Placeholder and discovery rules (see credentials.rs).
//!
//! Invariants / Assumptions:
//! - The process environment is read at most once and never written.
//! - Malformed `.env` lines are skipped; warnings never include line contents.
//! - The `DOTENV_DISABLED` variable is read from the ambient snapshot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::credentials::{discover_credentials, normalize_credentials_path};
use super::env::ModuleEnv;
use super::error::ConfigError;
use crate::constants::{
    CREDENTIALS_DIR_NAME, DOTENV_DISABLED, ENV_FILE_NAME, GOOGLE_APPLICATION_CREDENTIALS,
};
use crate::paths::{absolutize, global_config_dir, home_dir};

/// How values from one `.env` file are merged into the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    /// File values replace existing ones.
    Override,
    /// File values only fill variables that are not yet set.
    FillMissing,
}

/// Loads the effective environment for one module.
pub struct EnvLoader {
    module_root: PathBuf,
    ambient: Option<BTreeMap<String, String>>,
    home_dir: Option<Option<PathBuf>>,
    skip_dotenv: bool,
}

impl EnvLoader {
    /// Create a loader for the module rooted at `module_root`.
    pub fn new(module_root: impl Into<PathBuf>) -> Self {
        Self {
            module_root: module_root.into(),
            ambient: None,
            home_dir: None,
            skip_dotenv: false,
        }
    }

    /// Use `vars` instead of the process environment as the ambient layer.
    pub fn with_ambient<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.ambient = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Override the home directory used for `~` expansion and the ADC path.
    pub fn with_home_dir(mut self, home: Option<PathBuf>) -> Self {
        self.home_dir = Some(home);
        self
    }

    /// Ignore both `.env` files, as if `DOTENV_DISABLED` were set.
    pub fn without_dotenv(mut self) -> Self {
        self.skip_dotenv = true;
        self
    }

    /// Check if dotenv loading is disabled in the ambient layer.
    fn dotenv_disabled(vars: &BTreeMap<String, String>) -> bool {
        matches!(
            vars.get(DOTENV_DISABLED).map(String::as_str),
            Some("true") | Some("1")
        )
    }

    /// Build the module environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvIo` if a `.env` file exists but cannot be read.
    /// Missing files are silently skipped.
    pub fn load(self) -> Result<ModuleEnv, ConfigError> {
        let module_root = absolutize(&self.module_root);
        let global_dir = global_config_dir(&module_root);
        let module_env_file = module_root.join(ENV_FILE_NAME);
        let global_env_file = global_dir.join(ENV_FILE_NAME);
        let home_dir = self.home_dir.unwrap_or_else(home_dir);

        let mut vars = self
            .ambient
            .unwrap_or_else(|| std::env::vars_os().filter_map(utf8_pair).collect());

        let (module_env_loaded, global_env_loaded) = if self.skip_dotenv
            || Self::dotenv_disabled(&vars)
        {
            debug!("dotenv loading disabled; using ambient environment only");
            (false, false)
        } else {
            let module_loaded = apply_env_file(&mut vars, &module_env_file, Merge::Override)?;
            if module_loaded {
                info!(path = %module_env_file.display(), "loaded module .env");
            }
            let global_loaded = apply_env_file(&mut vars, &global_env_file, Merge::FillMissing)?;
            if global_loaded {
                info!(path = %global_env_file.display(), "loaded global .env (no override)");
            }
            (module_loaded, global_loaded)
        };

        let mut credentials_path = normalize_credentials_path(
            vars.get(GOOGLE_APPLICATION_CREDENTIALS).map(String::as_str),
            &module_root,
            home_dir.as_deref(),
        );
        if credentials_path.is_none() {
            credentials_path = discover_credentials(&[
                module_root.join(CREDENTIALS_DIR_NAME),
                global_dir.join(CREDENTIALS_DIR_NAME),
            ]);
        }
        match &credentials_path {
            Some(path) => {
                vars.insert(
                    GOOGLE_APPLICATION_CREDENTIALS.to_string(),
                    path.to_string_lossy().into_owned(),
                );
            }
            None => {
                vars.remove(GOOGLE_APPLICATION_CREDENTIALS);
            }
        }

        Ok(ModuleEnv {
            module_root,
            global_dir,
            module_env_file,
            global_env_file,
            module_env_loaded,
            global_env_loaded,
            home_dir,
            vars,
            credentials_path,
        })
    }
}

fn utf8_pair((key, value): (std::ffi::OsString, std::ffi::OsString)) -> Option<(String, String)> {
    Some((key.into_string().ok()?, value.into_string().ok()?))
}

/// Merge one `.env` file into `vars`. Returns `Ok(false)` if the file does not exist.
fn apply_env_file(
    vars: &mut BTreeMap<String, String>,
    path: &Path,
    merge: Merge,
) -> Result<bool, ConfigError> {
    if !path.is_file() {
        return Ok(false);
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| dotenv_io_error(path, e))?;
    for (index, item) in iter.enumerate() {
        match item {
            Ok((key, value)) => {
                if merge == Merge::Override || !vars.contains_key(&key) {
                    vars.insert(key, value);
                }
            }
            Err(dotenvy::Error::LineParse(_, position)) => {
                warn!(
                    path = %path.display(),
                    entry = index + 1,
                    position,
                    "skipping malformed .env line"
                );
            }
            Err(e) => return Err(dotenv_io_error(path, e)),
        }
    }
    Ok(true)
}

fn dotenv_io_error(path: &Path, err: dotenvy::Error) -> ConfigError {
    let kind = match err {
        dotenvy::Error::Io(io_err) => io_err.kind(),
        _ => std::io::ErrorKind::InvalidData,
    };
    ConfigError::DotenvIo {
        path: path.to_path_buf(),
        kind,
    }
}
