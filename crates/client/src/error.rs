//! Error types for the Google Cloud client.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while minting tokens or calling Google APIs.
///
/// Messages never include private keys, refresh tokens or access tokens.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Credentials file could not be read.
    #[error("Could not read credentials file {path}: {source}")]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credentials file is not valid JSON or lacks required fields.
    #[error("Could not parse credentials file {path}: {message}")]
    CredentialsParse { path: PathBuf, message: String },

    /// Credentials file has a `type` this client cannot mint tokens for.
    #[error("Unsupported credentials type '{0}'")]
    UnsupportedCredentials(String),

    /// The service-account private key could not be used for signing.
    #[error("Invalid service-account private key: {0}")]
    InvalidKey(String),

    /// No credential source produced a token.
    #[error("No credentials available: {0}")]
    NoCredentials(String),

    /// The OAuth token endpoint rejected the request.
    #[error("Token endpoint returned {status}: {message}")]
    TokenEndpoint { status: u16, message: String },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API error response from a Google API.
    #[error("API error ({status}) at {url}: {message}")]
    ApiError {
        status: u16,
        url: String,
        message: String,
    },

    /// Response did not have the expected shape.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Check if this error indicates rejected or missing credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::TokenEndpoint { .. }
                | Self::NoCredentials(_)
                | Self::InvalidKey(_)
                | Self::ApiError { status: 401, .. }
        )
    }

    /// Check if this error is a permission problem on the target resource.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::ApiError { status: 403, .. })
    }
}
