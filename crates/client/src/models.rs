//! Response payloads from Google endpoints.

use secrecy::SecretString;
use serde::Deserialize;

use crate::serde_helpers::secret_string;

/// OAuth2 token endpoint and metadata server response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(deserialize_with = "secret_string")]
    pub access_token: SecretString,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth2 error body (`{"error": ..., "error_description": ...}`).
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// A Vertex AI index endpoint, as returned by `IndexEndpoints.get`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEndpoint {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}
