//! Common test utilities for integration tests.
//!
//! # Invariants
//! - Fixtures are loaded from the `tests/fixtures/` directory relative to the crate root
//! - Credential files are written into a per-test temp directory
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)

use std::path::{Path, PathBuf};

#[allow(unused_imports)]
pub use mobius_client::{ClientError, CredentialSource, GcpClient, Principal};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_EMAIL: &str = "chat@mobius-dev.iam.gserviceaccount.com";

/// Load a text fixture from `tests/fixtures/`.
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
pub fn service_account_json(token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "mobius-dev",
        "private_key_id": "fixture-key-1",
        "private_key": load_fixture("test_service_account_key.pem"),
        "client_email": CLIENT_EMAIL,
        "token_uri": token_uri,
    })
    .to_string()
}

/// gcloud user ADC JSON.
#[allow(dead_code)]
pub fn authorized_user_json() -> String {
    serde_json::json!({
        "type": "authorized_user",
        "client_id": "123.apps.googleusercontent.com",
        "client_secret": "fixture-client-secret",
        "refresh_token": "1//fixture-refresh-token",
        "quota_project_id": "mobius-analytics",
    })
    .to_string()
}

/// Write `content` to `<dir>/<name>` and return the path.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture file");
    path
}

/// Client whose every outbound URL points at `server`.
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> GcpClient {
    GcpClient::builder()
        .default_token_uri(format!("{}/token", server.uri()))
        .metadata_base_url(server.uri())
        .vertex_base_url(server.uri())
        .build()
        .expect("build client")
}

/// Token endpoint success body.
#[allow(dead_code)]
pub fn token_body(token: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": token,
        "expires_in": 3599,
        "token_type": "Bearer",
    })
}
