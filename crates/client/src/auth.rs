//! Credential sources and minted access tokens.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use mobius_config::constants::JWT_ASSERTION_LIFETIME_SECS;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::credentials::ServiceAccountKey;
use crate::error::{ClientError, Result};

/// Where an access token should come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// An explicit service-account key file (`GOOGLE_APPLICATION_CREDENTIALS`).
    ServiceAccountFile(PathBuf),
    /// Ambient default credentials: the gcloud ADC file if present,
    /// otherwise the GCE metadata server.
    ApplicationDefault {
        adc_path: Option<PathBuf>,
        project_override: Option<String>,
    },
}

/// Who the minted token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A service account, identified by its email.
    ServiceAccount { email: String },
    /// Application default credentials, with the project they resolved to.
    ApplicationDefault { project_id: Option<String> },
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount { email } => write!(f, "OK (service account): {email}"),
            Self::ApplicationDefault { project_id } => write!(
                f,
                "OK (application default credentials) project={}",
                project_id.as_deref().unwrap_or("(unknown)")
            ),
        }
    }
}

/// A bearer token for Google APIs.
///
/// The token value is only reachable through [`AccessToken::bearer`].
#[derive(Debug, Clone)]
pub struct AccessToken {
    token: SecretString,
    expires_in: Option<u64>,
    principal: Principal,
}

impl AccessToken {
    pub(crate) fn new(token: SecretString, expires_in: Option<u64>, principal: Principal) -> Self {
        Self {
            token,
            expires_in,
            principal,
        }
    }

    /// Raw token value for an `Authorization: Bearer` header.
    pub fn bearer(&self) -> &str {
        self.token.expose_secret()
    }

    /// Lifetime reported by the issuer, in seconds.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Build a signed RS256 JWT assertion for the OAuth JWT-bearer grant.
pub(crate) fn sign_assertion(
    key: &ServiceAccountKey,
    scope: &str,
    audience: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
        .map_err(|e| ClientError::InvalidKey(e.to_string()))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope,
        aud: audience,
        iat,
        exp: iat + JWT_ASSERTION_LIFETIME_SECS,
    };

    jsonwebtoken::encode(&header, &claims, &encoding_key)
        .map_err(|e| ClientError::InvalidKey(e.to_string()))
}
