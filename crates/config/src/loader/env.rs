//! The resolved environment of one module.
//!
//! Responsibilities:
//! - Hold the merged variables and the normalized credentials path.
//! - Provide read accessors with empty/whitespace/placeholder filtering.
//!
//! Invariants:
//! - A `ModuleEnv` is immutable once built by `EnvLoader::load`.
//! - `GOOGLE_APPLICATION_CREDENTIALS` in `vars` always equals `credentials_path`
//!   (present with the absolute path, or absent).
//! - Values returned by the filtered accessors are trimmed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::credentials::is_placeholder;
use super::error::ConfigError;
use crate::constants::CLOUDSDK_CONFIG;
use crate::paths::gcloud_adc_path;

/// Effective environment for one module after layering and normalization.
#[derive(Debug, Clone)]
pub struct ModuleEnv {
    pub(crate) module_root: PathBuf,
    pub(crate) global_dir: PathBuf,
    pub(crate) module_env_file: PathBuf,
    pub(crate) global_env_file: PathBuf,
    pub(crate) module_env_loaded: bool,
    pub(crate) global_env_loaded: bool,
    pub(crate) home_dir: Option<PathBuf>,
    pub(crate) vars: BTreeMap<String, String>,
    pub(crate) credentials_path: Option<PathBuf>,
}

impl ModuleEnv {
    /// Absolute module root the environment was loaded for.
    pub fn module_root(&self) -> &Path {
        &self.module_root
    }

    /// Global configuration directory (`<module_root>/../mobius-config`).
    pub fn global_dir(&self) -> &Path {
        &self.global_dir
    }

    /// Path of the module `.env` file, whether or not it exists.
    pub fn module_env_file(&self) -> &Path {
        &self.module_env_file
    }

    /// Path of the global `.env` file, whether or not it exists.
    pub fn global_env_file(&self) -> &Path {
        &self.global_env_file
    }

    /// True if the module `.env` file was present and read.
    pub fn module_env_loaded(&self) -> bool {
        self.module_env_loaded
    }

    /// True if the global `.env` file was present and read.
    pub fn global_env_loaded(&self) -> bool {
        self.global_env_loaded
    }

    /// Normalized path to an existing service-account key file.
    pub fn credentials_path(&self) -> Option<&Path> {
        self.credentials_path.as_deref()
    }

    /// Home directory used for `~` expansion.
    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    /// Location of the gcloud application default credentials file.
    pub fn gcloud_adc_path(&self) -> Option<PathBuf> {
        gcloud_adc_path(self.raw(CLOUDSDK_CONFIG), self.home_dir())
    }

    /// Merged value exactly as loaded, including blanks and placeholders.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of `key`, or `None` if unset, blank, or a placeholder.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_with_placeholders(key, &[])
    }

    /// Like [`get`](Self::get), additionally treating any of `placeholders` as unset.
    pub fn get_with_placeholders(&self, key: &str, placeholders: &[&str]) -> Option<&str> {
        let value = self.raw(key)?.trim();
        if value.is_empty() || placeholders.contains(&value) || is_placeholder(value) {
            return None;
        }
        Some(value)
    }

    /// Value of `key`, falling back to `default` when [`get`](Self::get) returns `None`.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Value of `key`, or `ConfigError::MissingEnvVar`.
    ///
    /// Only blank values count as missing here; connection strings and other
    /// required settings are taken as written.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.raw(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// True if `key` has a non-blank value.
    pub fn is_set(&self, key: &str) -> bool {
        self.raw(key).is_some_and(|v| !v.trim().is_empty())
    }

    /// Number of merged variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True if no variables are set at all.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
