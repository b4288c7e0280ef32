//! GCE metadata server token endpoint.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::endpoints::token::parse_token_response;
use crate::error::Result;
use crate::models::TokenResponse;

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Fetch a token for the instance's default service account.
///
/// Off-GCE the host does not resolve; `timeout` keeps that failure short.
pub async fn metadata_token(
    client: &Client,
    base_url: &str,
    scope: &str,
    timeout: Duration,
) -> Result<TokenResponse> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH);
    debug!(url = %url, "Requesting access token from metadata server");

    let response = client
        .get(&url)
        .header("Metadata-Flavor", "Google")
        .query(&[("scopes", scope)])
        .timeout(timeout)
        .send()
        .await?;
    parse_token_response(response).await
}

const PROJECT_ID_PATH: &str = "/computeMetadata/v1/project/project-id";

/// Fetch the project id of the instance.
pub async fn metadata_project_id(
    client: &Client,
    base_url: &str,
    timeout: Duration,
) -> Result<String> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), PROJECT_ID_PATH);

    let response = client
        .get(&url)
        .header("Metadata-Flavor", "Google")
        .timeout(timeout)
        .send()
        .await?;
    let response = crate::endpoints::ensure_success(response).await?;
    Ok(response.text().await?.trim().to_string())
}
