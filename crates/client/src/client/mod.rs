//! Google Cloud client: token minting and the Vertex index-endpoint probe.
//!
//! # What this module does NOT handle:
//! - Token caching or refresh; every call mints a fresh token.
//! - Retries; one failed request is one failed check.

pub mod builder;

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use mobius_config::constants::CLOUD_PLATFORM_SCOPE;
use tracing::{debug, info};

use crate::auth::{AccessToken, CredentialSource, Principal, sign_assertion};
use crate::credentials::{CredentialsFile, ServiceAccountKey};
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::models::{IndexEndpoint, TokenResponse};
use crate::vertex::regional_base_url;

pub use builder::GcpClientBuilder;

/// Client for Google OAuth and Vertex AI.
#[derive(Debug, Clone)]
pub struct GcpClient {
    pub(crate) http: reqwest::Client,
    pub(crate) metadata_timeout: Duration,
    pub(crate) metadata_base_url: String,
    pub(crate) default_token_uri: String,
    pub(crate) vertex_base_url: Option<String>,
}

impl GcpClient {
    /// Create a new client builder.
    pub fn builder() -> GcpClientBuilder {
        GcpClientBuilder::new()
    }

    /// Mint an access token from the given source.
    ///
    /// A service-account file signs a JWT assertion and exchanges it at the
    /// key's `token_uri`. Application default credentials use the ADC file
    /// when it exists, otherwise the GCE metadata server.
    pub async fn mint_access_token(&self, source: &CredentialSource) -> Result<AccessToken> {
        match source {
            CredentialSource::ServiceAccountFile(path) => {
                match CredentialsFile::from_path(path)? {
                    CredentialsFile::ServiceAccount(key) => {
                        let response = self.exchange_service_account(&key).await?;
                        info!(client_email = %key.client_email, "Minted service-account access token");
                        Ok(into_token(
                            response,
                            Principal::ServiceAccount {
                                email: key.client_email,
                            },
                        ))
                    }
                    other => Err(ClientError::UnsupportedCredentials(other.kind().to_string())),
                }
            }
            CredentialSource::ApplicationDefault {
                adc_path,
                project_override,
            } => match adc_path.as_deref().filter(|p| p.is_file()) {
                Some(path) => self.mint_from_adc_file(path, project_override.clone()).await,
                None => self.mint_from_metadata(project_override.clone()).await,
            },
        }
    }

    async fn mint_from_adc_file(
        &self,
        path: &Path,
        project_override: Option<String>,
    ) -> Result<AccessToken> {
        debug!(path = %path.display(), "Using application default credentials file");
        let credentials = CredentialsFile::from_path(path)?;
        let project_id = project_override.or_else(|| credentials.project_id().map(str::to_string));

        let response = match &credentials {
            CredentialsFile::ServiceAccount(key) => self.exchange_service_account(key).await?,
            CredentialsFile::AuthorizedUser(user) => {
                endpoints::refresh_token_grant(&self.http, &self.default_token_uri, user).await?
            }
        };
        info!(kind = credentials.kind(), "Minted application default access token");
        Ok(into_token(response, Principal::ApplicationDefault { project_id }))
    }

    async fn mint_from_metadata(&self, project_override: Option<String>) -> Result<AccessToken> {
        debug!(base_url = %self.metadata_base_url, "No ADC file; trying metadata server");
        let response = endpoints::metadata_token(
            &self.http,
            &self.metadata_base_url,
            CLOUD_PLATFORM_SCOPE,
            self.metadata_timeout,
        )
        .await
        .map_err(|e| match e {
            ClientError::HttpError(err) => ClientError::NoCredentials(format!(
                "no application default credentials file and the metadata server is unreachable ({err})"
            )),
            other => other,
        })?;

        let project_id = match project_override {
            Some(project) => Some(project),
            None => endpoints::metadata_project_id(
                &self.http,
                &self.metadata_base_url,
                self.metadata_timeout,
            )
            .await
            .ok()
            .filter(|p| !p.is_empty()),
        };
        info!("Minted access token from metadata server");
        Ok(into_token(response, Principal::ApplicationDefault { project_id }))
    }

    async fn exchange_service_account(&self, key: &ServiceAccountKey) -> Result<TokenResponse> {
        let token_uri = key
            .token_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .unwrap_or(&self.default_token_uri);
        let assertion = sign_assertion(key, CLOUD_PLATFORM_SCOPE, token_uri, Utc::now())?;
        endpoints::jwt_bearer_grant(&self.http, token_uri, &assertion).await
    }

    /// Fetch an index endpoint by resource name from its regional API host.
    pub async fn get_index_endpoint(
        &self,
        token: &AccessToken,
        name: &str,
        region: &str,
    ) -> Result<IndexEndpoint> {
        let base_url = self
            .vertex_base_url
            .clone()
            .unwrap_or_else(|| regional_base_url(region));
        endpoints::get_index_endpoint(&self.http, &base_url, token.bearer(), name).await
    }
}

fn into_token(response: TokenResponse, principal: Principal) -> AccessToken {
    AccessToken::new(response.access_token, response.expires_in, principal)
}
