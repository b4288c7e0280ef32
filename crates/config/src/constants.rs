//! Centralized constants for the Mobius ops workspace.
//!
//! File names, directory names and variable names shared by the loader,
//! the doctor and the replicator live here so they are spelled once.

// =============================================================================
// Configuration Layout
// =============================================================================

/// Name of the per-module and global dotenv file.
pub const ENV_FILE_NAME: &str = ".env";

/// Directory holding the shared (global) configuration, a sibling of every module.
pub const GLOBAL_CONFIG_DIR_NAME: &str = "mobius-config";

/// Directory scanned for service-account key files.
pub const CREDENTIALS_DIR_NAME: &str = "credentials";

/// Extension of service-account key files picked up by discovery.
pub const CREDENTIALS_FILE_EXTENSION: &str = "json";

// =============================================================================
// Well-Known Variables
// =============================================================================

/// Path to a Google service-account key file.
pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Overrides the gcloud configuration directory (and therefore the ADC file location).
pub const CLOUDSDK_CONFIG: &str = "CLOUDSDK_CONFIG";

/// Set to `1` or `true` to skip reading `.env` files entirely.
pub const DOTENV_DISABLED: &str = "DOTENV_DISABLED";

/// Overrides repository root discovery for the CLI.
pub const MOBIUS_REPO_ROOT: &str = "MOBIUS_REPO_ROOT";

// =============================================================================
// Placeholder Detection
// =============================================================================

/// Substrings that mark a value as a copy-pasted template rather than a real setting.
///
/// Matched case-sensitively except for `your-`, which is matched against the
/// lower-cased value.
pub const PLACEHOLDER_MARKERS: &[&str] = &["/path/to/", "your-service-account"];

/// Lower-cased "replace this" prefix used in example `.env` files.
pub const PLACEHOLDER_PREFIX: &str = "your-";

/// Application default credentials file name inside the gcloud config directory.
pub const ADC_FILE_NAME: &str = "application_default_credentials.json";

// =============================================================================
// Google Cloud
// =============================================================================

/// OAuth scope requested for every minted access token.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Token endpoint used when a credentials file does not name one.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Base URL of the GCE metadata server.
pub const METADATA_BASE_URL: &str = "http://metadata.google.internal";

/// `host[:port]` that replaces the metadata server host, as honored by Google client libraries.
pub const GCE_METADATA_HOST: &str = "GCE_METADATA_HOST";

/// Metadata server probes give up quickly off-GCE.
pub const METADATA_TIMEOUT_SECS: u64 = 2;

/// Default HTTP timeout for token and Vertex requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Lifetime requested for self-signed JWT assertions.
pub const JWT_ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Vertex region used when neither the endpoint id nor `VERTEX_LOCATION` names one.
pub const DEFAULT_VERTEX_REGION: &str = "us-central1";

/// Environment variable naming the Vertex region.
pub const VERTEX_LOCATION: &str = "VERTEX_LOCATION";

// =============================================================================
// Table Replicator
// =============================================================================

/// Module whose environment supplies the replicator's destination.
pub const CHAT_MODULE_DIR: &str = "mobius-chat";

/// Source (production) connection string.
pub const PROD_CHAT_DATABASE_URL: &str = "PROD_CHAT_DATABASE_URL";

/// Destination (development) connection string.
pub const CHAT_RAG_DATABASE_URL: &str = "CHAT_RAG_DATABASE_URL";
