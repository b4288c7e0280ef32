//! Google credential files: service-account keys and application default credentials.
//!
//! Responsibilities:
//! - Parse a credentials JSON file into a typed [`CredentialsFile`].
//! - Produce a redacted [`ServiceAccountSummary`] for diagnostics.
//!
//! Invariants:
//! - Private keys, client secrets and refresh tokens are held as [`SecretString`]
//!   and never appear in `Debug` output, summaries or error messages.

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::serde_helpers::{non_empty_value, secret_string};

/// `type` value of a service-account key file.
pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// `type` value of a gcloud user ADC file.
pub const AUTHORIZED_USER_TYPE: &str = "authorized_user";

/// A service-account key as downloaded from the Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    #[serde(deserialize_with = "secret_string")]
    pub private_key: SecretString,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// User credentials written by `gcloud auth application-default login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    #[serde(deserialize_with = "secret_string")]
    pub client_secret: SecretString,
    #[serde(deserialize_with = "secret_string")]
    pub refresh_token: SecretString,
    #[serde(default)]
    pub quota_project_id: Option<String>,
}

/// A parsed credentials file.
#[derive(Debug, Clone)]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

impl CredentialsFile {
    /// Read and parse a credentials file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            ClientError::CredentialsRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json(path, &content)
    }

    /// Parse credentials JSON. `path` is only used for error messages.
    pub fn from_json(path: &Path, content: &str) -> Result<Self> {
        let parse_error = |message: String| ClientError::CredentialsParse {
            path: path.to_path_buf(),
            message,
        };

        let value: Value =
            serde_json::from_str(content).map_err(|e| parse_error(format!("invalid JSON: {e}")))?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| parse_error("missing \"type\" field".to_string()))?
            .to_string();

        match kind.as_str() {
            SERVICE_ACCOUNT_TYPE => serde_json::from_value(value)
                .map(Self::ServiceAccount)
                .map_err(|e| parse_error(e.to_string())),
            AUTHORIZED_USER_TYPE => serde_json::from_value(value)
                .map(Self::AuthorizedUser)
                .map_err(|e| parse_error(e.to_string())),
            _ => Err(ClientError::UnsupportedCredentials(kind)),
        }
    }

    /// The `type` string this file was parsed from.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => SERVICE_ACCOUNT_TYPE,
            Self::AuthorizedUser(_) => AUTHORIZED_USER_TYPE,
        }
    }

    /// Project associated with the credentials, if the file names one.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::ServiceAccount(key) => key.project_id.as_deref(),
            Self::AuthorizedUser(user) => user.quota_project_id.as_deref(),
        }
    }
}

/// Non-sensitive fields of a credentials JSON file.
///
/// The descriptive fields keep whatever JSON value the file holds; a missing
/// field is `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAccountSummary {
    pub ok: bool,
    #[serde(rename = "type")]
    pub kind: Value,
    pub project_id: Value,
    pub client_email: Value,
    pub private_key_present: bool,
}

/// Why a summary could not be produced.
pub const SUMMARY_ERROR: &str = "Could not read/parse JSON";

#[derive(Deserialize)]
struct SummaryFields {
    #[serde(default, rename = "type")]
    kind: Value,
    #[serde(default)]
    project_id: Value,
    #[serde(default)]
    client_email: Value,
    #[serde(default, rename = "private_key", deserialize_with = "non_empty_value")]
    private_key_present: bool,
}

impl ServiceAccountSummary {
    /// Summarize a credentials file without exposing any secret.
    ///
    /// Any file shape is accepted as long as it is a JSON object; missing
    /// fields become `null`. Returns [`SUMMARY_ERROR`] when the file cannot
    /// be read or is not a JSON object.
    pub fn from_path(path: &Path) -> std::result::Result<Self, &'static str> {
        let content = std::fs::read_to_string(path).map_err(|_| SUMMARY_ERROR)?;
        Self::from_json(&content)
    }

    /// Summarize credentials JSON text.
    pub fn from_json(content: &str) -> std::result::Result<Self, &'static str> {
        let value: Value = serde_json::from_str(content).map_err(|_| SUMMARY_ERROR)?;
        if !value.is_object() {
            return Err(SUMMARY_ERROR);
        }
        let fields: SummaryFields = serde_json::from_value(value).map_err(|_| SUMMARY_ERROR)?;
        Ok(Self {
            ok: true,
            kind: fields.kind,
            project_id: fields.project_id,
            client_email: fields.client_email,
            private_key_present: fields.private_key_present,
        })
    }

    /// The `project_id` field when it is a string.
    pub fn project_id_str(&self) -> Option<&str> {
        self.project_id.as_str()
    }

    /// Compact JSON rendering used by the doctor report.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"ok\":{}}}", self.ok))
    }
}
