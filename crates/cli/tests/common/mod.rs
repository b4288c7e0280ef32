//! Shared test utilities for mobius-ops integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory bound to a temporary repository.
//! - Lay out module and global `.env` files inside that repository.
//!
//! Invariants / Assumptions:
//! - Host variables the commands read are removed from the child environment.
//! - The gcloud config directory points inside the temp repo, so no host ADC file is found.
//! - The metadata server points at a closed local port, so ambient credentials fail fast.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Variables that would otherwise leak from the developer's shell into a test.
const HOST_VARS: &[&str] = &[
    "MOBIUS_REPO_ROOT",
    "DOTENV_DISABLED",
    "RUST_LOG",
    "GOOGLE_APPLICATION_CREDENTIALS",
    "GOOGLE_CLOUD_PROJECT",
    "CLOUDSDK_CONFIG",
    "GCE_METADATA_HOST",
    "ENV",
    "QUEUE_TYPE",
    "REDIS_URL",
    "VERTEX_PROJECT_ID",
    "VERTEX_LOCATION",
    "VERTEX_MODEL",
    "VERTEX_INDEX_ENDPOINT_ID",
    "CHAT_LLM_PROVIDER",
    "LLM_PROVIDER",
    "JWT_SECRET",
    "PROD_CHAT_DATABASE_URL",
    "CHAT_RAG_DATABASE_URL",
];

#[allow(dead_code)]
pub const CLIENT_EMAIL: &str = "doctor@mobius-dev.iam.gserviceaccount.com";

/// A throwaway Mobius repository.
pub struct TestRepo {
    dir: TempDir,
}

#[allow(dead_code)]
impl TestRepo {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp repo"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create `<root>/<name>` and return it.
    pub fn module(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        std::fs::create_dir_all(&path).expect("create module dir");
        path
    }

    /// Write `<root>/<module>/.env`.
    pub fn write_module_env(&self, module: &str, contents: &str) {
        let dir = self.module(module);
        std::fs::write(dir.join(".env"), contents).expect("write module .env");
    }

    /// Write `<root>/mobius-config/.env`.
    pub fn write_global_env(&self, contents: &str) {
        self.write_module_env("mobius-config", contents);
    }

    /// Write a file under the repo and return its path.
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }
}

/// Returns a hermetic `mobius-ops` command rooted at `repo`.
pub fn mobius_cmd(repo: &TestRepo) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mobius-ops");
    for var in HOST_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(repo.root())
        .env("MOBIUS_REPO_ROOT", repo.root())
        .env("CLOUDSDK_CONFIG", repo.root().join("gcloud"))
        .env("GCE_METADATA_HOST", "127.0.0.1:9");
    cmd
}

/// Load a text fixture from `tests/fixtures/`.
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()))
}

/// Service-account JSON signed with the fixture key, pointing at `token_uri`.
#[allow(dead_code)]
pub fn service_account_json(project_id: &str, token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": project_id,
        "private_key_id": "fixture-key-1",
        "private_key": load_fixture("test_service_account_key.pem"),
        "client_email": CLIENT_EMAIL,
        "token_uri": token_uri,
    })
    .to_string()
}

/// Lossy stdout of a finished command.
#[allow(dead_code)]
pub fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
