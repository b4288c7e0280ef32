//! Vertex AI index endpoint API.

use reqwest::Client;
use tracing::debug;

use crate::endpoints::ensure_success;
use crate::error::{ClientError, Result};
use crate::models::IndexEndpoint;

/// `GET {base_url}/v1/{name}` for an index endpoint resource.
pub async fn get_index_endpoint(
    client: &Client,
    base_url: &str,
    bearer: &str,
    name: &str,
) -> Result<IndexEndpoint> {
    let url = format!(
        "{}/v1/{}",
        base_url.trim_end_matches('/'),
        name.trim_start_matches('/')
    );
    debug!(url = %url, "Getting Vertex index endpoint");

    let response = client
        .get(&url)
        .header("Authorization", format!("Bearer {bearer}"))
        .send()
        .await?;
    let response = ensure_success(response).await?;

    response.json::<IndexEndpoint>().await.map_err(|e| {
        ClientError::InvalidResponse(format!("Failed to parse index endpoint: {e}"))
    })
}
