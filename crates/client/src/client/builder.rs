//! Client builder for constructing [`GcpClient`] instances.
//!
//! # Invariants
//! - Base URLs are stored without trailing slashes.
//! - The metadata timeout is independent of the general request timeout.

use std::time::Duration;

use mobius_config::constants::{
    DEFAULT_TIMEOUT_SECS, GOOGLE_TOKEN_URI, METADATA_BASE_URL,
    METADATA_TIMEOUT_SECS,
};

use crate::client::GcpClient;
use crate::error::Result;

/// Builder for creating a new [`GcpClient`].
///
/// Every option has a production default; the URL overrides exist so tests
/// can point the client at a mock server.
///
/// ```rust,ignore
/// let client = GcpClient::builder()
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
pub struct GcpClientBuilder {
    timeout: Duration,
    metadata_timeout: Duration,
    metadata_base_url: String,
    default_token_uri: String,
    vertex_base_url: Option<String>,
}

impl Default for GcpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            metadata_timeout: Duration::from_secs(METADATA_TIMEOUT_SECS),
            metadata_base_url: METADATA_BASE_URL.to_string(),
            default_token_uri: GOOGLE_TOKEN_URI.to_string(),
            vertex_base_url: None,
        }
    }
}

impl GcpClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout. Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the metadata server timeout. Default is 2 seconds.
    pub fn metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }

    /// Override the metadata server base URL.
    pub fn metadata_base_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_base_url = url.into();
        self
    }

    /// Token endpoint used when a credentials file has no `token_uri`
    /// and for user refresh-token grants.
    pub fn default_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.default_token_uri = uri.into();
        self
    }

    /// Send Vertex requests to this base URL instead of the regional host.
    pub fn vertex_base_url(mut self, url: impl Into<String>) -> Self {
        self.vertex_base_url = Some(url.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GcpClient> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(GcpClient {
            http,
            metadata_timeout: self.metadata_timeout,
            metadata_base_url: normalize(self.metadata_base_url),
            default_token_uri: self.default_token_uri,
            vertex_base_url: self.vertex_base_url.map(normalize),
        })
    }
}

fn normalize(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = GcpClientBuilder::new().build().unwrap();
        assert_eq!(client.metadata_base_url, "http://metadata.google.internal");
        assert_eq!(client.default_token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(client.vertex_base_url, None);
        assert_eq!(client.metadata_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_builder_strips_trailing_slashes() {
        let client = GcpClientBuilder::new()
            .metadata_base_url("http://127.0.0.1:9000//")
            .vertex_base_url("http://127.0.0.1:9001/")
            .build()
            .unwrap();
        assert_eq!(client.metadata_base_url, "http://127.0.0.1:9000");
        assert_eq!(client.vertex_base_url.as_deref(), Some("http://127.0.0.1:9001"));
    }
}
