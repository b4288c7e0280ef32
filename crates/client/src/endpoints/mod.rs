//! REST endpoint implementations.
//!
//! Each function performs exactly one HTTP request and maps non-success
//! statuses to typed errors. Nothing here retries.

mod metadata;
mod token;
mod vertex;

pub use metadata::{metadata_project_id, metadata_token};
pub use token::{jwt_bearer_grant, refresh_token_grant};
pub use vertex::get_index_endpoint;

use reqwest::Response;

use crate::error::{ClientError, Result};

/// Return the response unchanged if it succeeded, else an `ApiError` carrying the body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::ApiError {
        status,
        url,
        message: api_error_message(&body),
    })
}

/// Google APIs wrap failures as `{"error": {"message": ...}}`; fall back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
