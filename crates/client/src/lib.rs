//! Google Cloud identity and Vertex AI client for Mobius diagnostics.
//!
//! This crate mints OAuth2 access tokens from service-account keys,
//! gcloud application default credentials or the GCE metadata server, and
//! reads Vertex AI index endpoints. It never logs or returns secret values
//! in plain text.

mod auth;
pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod models;
mod serde_helpers;
pub mod vertex;

pub use auth::{AccessToken, CredentialSource, Principal};
pub use client::{GcpClient, GcpClientBuilder};
pub use credentials::{CredentialsFile, SUMMARY_ERROR, ServiceAccountSummary};
pub use error::{ClientError, Result};
pub use models::IndexEndpoint;
pub use vertex::region_for_resource;
