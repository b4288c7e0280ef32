//! Tests for the module environment loader.
//!
//! Responsibilities:
//! - Test module/global/ambient precedence.
//! - Test credentials normalization and discovery through the loader.
//! - Test accessor filtering (blank, placeholder, caller placeholders).
//! - Test dotenv gating and malformed-file handling.
//!
//! Invariants:
//! - Tests inject the ambient layer with `with_ambient` and never touch the
//!   process environment, except where marked `#[serial]`.
//! - Each test builds its own repository layout in a `TempDir`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;


/// A throwaway repository with one module and the shared `mobius-config` directory.
pub struct RepoFixture {
    pub dir: TempDir,
}

impl RepoFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("mobius-chat")).unwrap();
        fs::create_dir_all(dir.path().join("mobius-config")).unwrap();
        Self { dir }
    }

    pub fn module_root(&self) -> PathBuf {
        self.dir.path().join("mobius-chat")
    }

    pub fn global_dir(&self) -> PathBuf {
        self.dir.path().join("mobius-config")
    }

    pub fn write_module_env(&self, contents: &str) {
        fs::write(self.module_root().join(".env"), contents).unwrap();
    }

    pub fn write_global_env(&self, contents: &str) {
        fs::write(self.global_dir().join(".env"), contents).unwrap();
    }

    /// Write `name` under `<base>/credentials/` and return its path.
    pub fn write_credentials(&self, base: &Path, name: &str) -> PathBuf {
        let dir = base.join("credentials");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, r#"{"type":"service_account"}"#).unwrap();
        path
    }
}

/// Ambient layer with nothing in it.
pub fn no_ambient() -> Vec<(String, String)> {
    Vec::new()
}
