//! Environment doctor command implementation.
//!
//! Responsibilities:
//! - Load a module's environment the way its services do and print the key variables.
//! - Flag common misconfigurations.
//! - Check that credentials can mint an access token and, optionally, read a Vertex resource.
//!
//! Does NOT handle:
//! - Fixing anything; every check is read-only.
//!
//! Invariants:
//! - Secret values, private keys and access tokens are never printed.
//! - Check failures are reported in the output; they never fail the command.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mobius_client::{
    AccessToken, ClientError, CredentialSource, GcpClient, ServiceAccountSummary,
    region_for_resource,
};
use mobius_config::constants::{
    ENV_FILE_NAME, GCE_METADATA_HOST, GLOBAL_CONFIG_DIR_NAME, GOOGLE_APPLICATION_CREDENTIALS,
    VERTEX_LOCATION,
};
use mobius_config::paths::{absolutize, expand_home};
use mobius_config::{ConfigError, EnvLoader, ModuleEnv};
use tracing::{debug, info, warn};

use crate::error::CliError;

const COMMON_KEYS: &[&str] = &[
    "ENV",
    "QUEUE_TYPE",
    "REDIS_URL",
    "GOOGLE_APPLICATION_CREDENTIALS",
    "VERTEX_PROJECT_ID",
    "VERTEX_LOCATION",
    "VERTEX_MODEL",
];

const CHAT_KEYS: &[&str] = &[
    "CHAT_RAG_DATABASE_URL",
    "VERTEX_INDEX_ENDPOINT_ID",
    "VERTEX_DEPLOYED_INDEX_ID",
    "CHAT_LLM_PROVIDER",
    "LLM_PROVIDER",
    "OLLAMA_BASE_URL",
    "OLLAMA_MODEL",
    "MOBIUS_OS_AUTH_URL",
    "USER_DATABASE_URL",
    "JWT_SECRET",
    "CHAT_LIVE_STREAM",
    "CHAT_DEBUG_TRACE",
];

const RAG_KEYS: &[&str] = &[
    "DATABASE_URL",
    "GCS_BUCKET",
    "VERTEX_INDEX_ENDPOINT_ID",
    "VERTEX_DEPLOYED_INDEX_ID",
    "LLM_PROVIDER",
];

const DBT_KEYS: &[&str] = &[
    "DATABASE_URL",
    "CHAT_DATABASE_URL",
    "BQ_PROJECT",
    "BQ_DATASET",
    "BQ_LANDING_DATASET",
    "GCS_BUCKET",
    "VERTEX_PROJECT",
    "VERTEX_REGION",
];

const OS_BACKEND_KEYS: &[&str] = &[
    "DATABASE_MODE",
    "CLOUDSQL_CONNECTION_NAME",
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "SECRET_KEY",
    "JWT_SECRET",
    "ENABLE_FIRESTORE",
    "GCP_PROJECT_ID",
    "GOOGLE_APPLICATION_CREDENTIALS",
];

/// Substrings of a variable name that mark its value as secret.
const SENSITIVE_MARKERS: &[&str] = &["SECRET", "PASSWORD", "TOKEN", "API_KEY", "PRIVATE_KEY"];

const UNSET: &str = "<unset>";

/// Options for `mobius-ops doctor`.
#[derive(Debug, Clone)]
pub struct DoctorOptions {
    pub module: String,
    pub verify_vertex: bool,
}

/// Run the doctor for one module and print the report to stdout.
pub async fn run(repo_root: &Path, options: &DoctorOptions) -> Result<()> {
    let module_root = resolve_module(repo_root, &options.module);
    if !module_root.is_dir() {
        return Err(CliError::ModuleNotFound(module_root).into());
    }

    let (env, load_error) = match EnvLoader::new(&module_root).load() {
        Ok(env) => (env, None),
        Err(e) => {
            warn!(error = %e, "Module environment could not be loaded; using ambient environment");
            let env = EnvLoader::new(&module_root)
                .without_dotenv()
                .load()
                .context("Failed to load ambient environment")?;
            (env, Some(e))
        }
    };
    let client = client_for(&env)?;

    let doctor = Doctor {
        repo_root,
        env: &env,
        load_error: load_error.as_ref(),
        client: &client,
    };
    let report = doctor.report(options.verify_vertex).await;
    print!("{report}");
    Ok(())
}

/// Absolute module identifiers pass through; anything else is relative to the repository root.
pub fn resolve_module(repo_root: &Path, module: &str) -> PathBuf {
    let module = Path::new(module.trim());
    if module.is_absolute() {
        absolutize(module)
    } else {
        absolutize(&repo_root.join(module))
    }
}

/// Key variables worth printing for the module at `module_root`.
pub fn key_variables(module_root: &Path) -> Vec<&'static str> {
    let extra: &[&str] = match module_name(module_root).as_str() {
        "mobius-chat" => CHAT_KEYS,
        "mobius-rag" => RAG_KEYS,
        "mobius-dbt" => DBT_KEYS,
        "mobius-os/backend" => return OS_BACKEND_KEYS.to_vec(),
        _ => &[],
    };
    COMMON_KEYS.iter().chain(extra).copied().collect()
}

fn module_name(module_root: &Path) -> String {
    let name = file_name(module_root);
    let parent = module_root.parent().map(file_name);
    if name == "backend" && parent.as_deref() == Some("mobius-os") {
        "mobius-os/backend".to_string()
    } else {
        name
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// True when values of `key` must never be printed.
pub fn is_sensitive(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    upper == "JWT_SECRET" || SENSITIVE_MARKERS.iter().any(|m| upper.contains(m))
}

/// How a variable's value appears in the report.
///
/// Blank or missing values print `<unset>`; secrets print `(set)`.
pub fn display_value(key: &str, value: Option<&str>) -> String {
    match value {
        None => UNSET.to_string(),
        Some(v) if v.trim().is_empty() => UNSET.to_string(),
        Some(_) if is_sensitive(key) => "(set)".to_string(),
        Some(v) => v.to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

// Trimmed, non-blank raw value; placeholders are deliberately kept visible.
fn value<'a>(env: &'a ModuleEnv, key: &str) -> Option<&'a str> {
    env.raw(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Advisory notes and warnings for a loaded environment.
pub fn heuristics(env: &ModuleEnv) -> Vec<String> {
    let mut lines = Vec::new();
    let provider = value(env, "CHAT_LLM_PROVIDER")
        .or_else(|| value(env, "LLM_PROVIDER"))
        .map(str::to_ascii_lowercase);

    if value(env, "VERTEX_PROJECT_ID").is_some() && provider.is_none() {
        lines.push(
            "- note=VERTEX_PROJECT_ID is set; some components default to Vertex/Gemini unless \
             CHAT_LLM_PROVIDER/LLM_PROVIDER is explicitly set."
                .to_string(),
        );
    }
    if matches!(provider.as_deref(), Some("vertex" | "gemini"))
        && value(env, GOOGLE_APPLICATION_CREDENTIALS).is_none()
    {
        lines.push(
            "- note=LLM provider is vertex but GOOGLE_APPLICATION_CREDENTIALS is unset; you must \
             have gcloud ADC or workload identity available."
                .to_string(),
        );
    }
    let redis_queue = value(env, "QUEUE_TYPE").is_some_and(|q| q.eq_ignore_ascii_case("redis"));
    if redis_queue && value(env, "REDIS_URL").is_none() {
        lines.push("- warning=QUEUE_TYPE=redis but REDIS_URL is unset.".to_string());
    }
    lines
}

/// Informational note when the key's project differs from the Vertex project.
pub fn project_mismatch_note(key_project: Option<&str>, vertex_project: Option<&str>) -> Option<String> {
    let key_project = key_project.map(str::trim).filter(|p| !p.is_empty())?;
    let vertex_project = vertex_project.map(str::trim).filter(|p| !p.is_empty())?;
    (key_project != vertex_project).then(|| {
        format!(
            "- note=service-account key project_id='{key_project}' differs from \
             VERTEX_PROJECT_ID='{vertex_project}'; this is OK only if the service account \
             has IAM roles in the Vertex project."
        )
    })
}

/// Which credentials the token check should use.
///
/// A configured `GOOGLE_APPLICATION_CREDENTIALS` is always treated as a
/// service-account key, even if the file is missing, so the failure is reported.
pub fn credential_source(env: &ModuleEnv) -> CredentialSource {
    match value(env, GOOGLE_APPLICATION_CREDENTIALS) {
        Some(path) => CredentialSource::ServiceAccountFile(expand_home(path, env.home_dir())),
        None => CredentialSource::ApplicationDefault {
            adc_path: env.gcloud_adc_path(),
            project_override: env.get("GOOGLE_CLOUD_PROJECT").map(str::to_string),
        },
    }
}

fn client_for(env: &ModuleEnv) -> Result<GcpClient> {
    let mut builder = GcpClient::builder();
    if let Some(host) = value(env, GCE_METADATA_HOST) {
        debug!(host, "Using metadata server override");
        builder = builder.metadata_base_url(format!("http://{host}"));
    }
    builder.build().context("Failed to build HTTP client")
}

/// Lines of the doctor output.
#[derive(Debug, Default)]
struct Report {
    lines: Vec<String>,
}

impl Report {
    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn kv(&mut self, key: &str, value: impl fmt::Display) {
        self.lines.push(format!("- {key}={value}"));
    }

    fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("== {title} =="));
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

struct Doctor<'a> {
    repo_root: &'a Path,
    env: &'a ModuleEnv,
    load_error: Option<&'a ConfigError>,
    client: &'a GcpClient,
}

impl Doctor<'_> {
    async fn report(&self, verify_vertex: bool) -> Report {
        let mut report = Report::default();
        let module_root = self.env.module_root();
        let global_env_file = self.repo_root.join(GLOBAL_CONFIG_DIR_NAME).join(ENV_FILE_NAME);

        report.line("Mobius env doctor");
        report.kv("repo_root", self.repo_root.display());
        report.kv("module_root", module_root.display());
        report.kv(
            "module_env_file_exists",
            yes_no(self.env.module_env_file().exists()),
        );
        report.kv("global_env_file_exists", yes_no(global_env_file.exists()));
        if let Some(e) = self.load_error {
            report.kv("env_load_error", e);
        }

        report.section(&format!("Key environment variables ({})", module_root.display()));
        for key in key_variables(module_root) {
            report.kv(key, display_value(key, self.env.raw(key)));
        }

        report.section("Heuristics / warnings");
        for line in heuristics(self.env) {
            report.line(line);
        }

        let token = self.credentials(&mut report).await;

        if verify_vertex {
            report.section("Vertex permission probe");
            let (ok, message) = self.vertex_probe(&token).await;
            report.kv("vertex_get_index_endpoint", yes_no(ok));
            report.kv("vertex_probe", message);
        }
        report
    }

    async fn credentials(&self, report: &mut Report) -> Result<AccessToken, ClientError> {
        let gac = value(self.env, GOOGLE_APPLICATION_CREDENTIALS);
        let gac_path = gac.map(|p| expand_home(p, self.env.home_dir()));
        let gac_exists = gac_path.as_deref().is_some_and(Path::exists);
        let adc_exists = self
            .env
            .gcloud_adc_path()
            .is_some_and(|p| p.exists());

        report.section("Credentials");
        report.kv(
            GOOGLE_APPLICATION_CREDENTIALS,
            display_value(GOOGLE_APPLICATION_CREDENTIALS, gac),
        );
        report.kv("GOOGLE_APPLICATION_CREDENTIALS_exists", yes_no(gac_exists));
        report.kv("gcloud_ADC_exists", yes_no(adc_exists));

        let summary = match gac_path.as_deref().filter(|_| gac_exists) {
            Some(path) => match ServiceAccountSummary::from_path(path) {
                Ok(summary) => {
                    report.kv("service_account_json_summary", summary.to_json());
                    Some(summary)
                }
                Err(message) => {
                    report.kv("service_account_json_summary_error", message);
                    None
                }
            },
            None => None,
        };

        let token = self
            .client
            .mint_access_token(&credential_source(self.env))
            .await;
        match &token {
            Ok(token) => {
                info!(expires_in = ?token.expires_in(), "Access token minted");
                report.kv("can_mint_access_token", "yes");
                report.kv("auth_check", token.principal());
            }
            Err(e) => {
                debug!(error = %e, "Access token check failed");
                report.kv("can_mint_access_token", "no");
                report.kv("auth_check", format!("FAILED to mint access token: {e}"));
            }
        }

        if let Some(note) = summary.as_ref().and_then(|s| {
            project_mismatch_note(s.project_id_str(), value(self.env, "VERTEX_PROJECT_ID"))
        }) {
            report.line(note);
        }
        token
    }

    async fn vertex_probe(&self, token: &Result<AccessToken, ClientError>) -> (bool, String) {
        let Some(endpoint) = value(self.env, "VERTEX_INDEX_ENDPOINT_ID") else {
            return (
                false,
                "SKIPPED (VERTEX_INDEX_ENDPOINT_ID is unset)".to_string(),
            );
        };
        let token = match token {
            Ok(token) => token,
            Err(e) => return (false, format!("FAILED get_index_endpoint: {e}")),
        };

        let region = region_for_resource(endpoint, self.env.raw(VERTEX_LOCATION));
        match self.client.get_index_endpoint(token, endpoint, &region).await {
            Ok(index_endpoint) => (
                true,
                format!(
                    "OK get_index_endpoint (region='{region}' display_name='{}')",
                    index_endpoint.display_name
                ),
            ),
            Err(e) => (false, format!("FAILED get_index_endpoint: {e}")),
        }
    }
}
