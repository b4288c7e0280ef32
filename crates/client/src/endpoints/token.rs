//! OAuth2 token endpoint grants.

use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::credentials::AuthorizedUser;
use crate::error::{ClientError, Result};
use crate::models::{OAuthErrorBody, TokenResponse};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Exchange a signed JWT assertion for an access token.
pub async fn jwt_bearer_grant(
    client: &Client,
    token_uri: &str,
    assertion: &str,
) -> Result<TokenResponse> {
    debug!(token_uri = %token_uri, "Requesting access token with JWT assertion");

    let response = client
        .post(token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
        .send()
        .await?;
    parse_token_response(response).await
}

/// Exchange a user refresh token for an access token.
pub async fn refresh_token_grant(
    client: &Client,
    token_uri: &str,
    user: &AuthorizedUser,
) -> Result<TokenResponse> {
    debug!(token_uri = %token_uri, "Refreshing user access token");

    let response = client
        .post(token_uri)
        .form(&[
            ("grant_type", "refresh_token"),
            ("client_id", user.client_id.as_str()),
            ("client_secret", user.client_secret.expose_secret()),
            ("refresh_token", user.refresh_token.expose_secret()),
        ])
        .send()
        .await?;
    parse_token_response(response).await
}

pub(crate) async fn parse_token_response(response: reqwest::Response) -> Result<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::TokenEndpoint {
            status: status.as_u16(),
            message: oauth_error_message(&body),
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse token response: {e}")))
}

fn oauth_error_message(body: &str) -> String {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(err) => match err.error_description {
            Some(desc) if !desc.is_empty() => format!("{}: {}", err.error, desc),
            _ => err.error,
        },
        Err(_) => body.trim().to_string(),
    }
}
