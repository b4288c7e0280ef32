//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Resolve the repository root from flags, environment and the working directory.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).

use clap::{ArgAction, Parser, Subcommand};
use mobius_config::paths::{absolutize, discover_repo_root};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mobius-ops")]
#[command(about = "Mobius ops utilities - environment diagnostics and table replication", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  mobius-ops doctor --module mobius-chat\n  mobius-ops doctor --module mobius-os/backend --verify-vertex\n  mobius-ops copy-rag-metadata\n"
)]
pub struct Cli {
    /// Repository root containing the module directories and mobius-config
    ///
    /// Defaults to the nearest ancestor of the current directory that contains
    /// a `mobius-config` directory, else the current directory.
    #[arg(long, global = true, env = "MOBIUS_REPO_ROOT", value_name = "DIR")]
    pub repo_root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report the effective environment, credentials and Vertex access of a module
    Doctor {
        /// Module directory name (e.g. mobius-chat) or path, relative to the repository root
        #[arg(long, value_parser = non_blank)]
        module: String,

        /// Also call Vertex AI IndexEndpoints.get for VERTEX_INDEX_ENDPOINT_ID
        #[arg(long)]
        verify_vertex: bool,
    },

    /// Replace the dev published_rag_metadata table with a copy of prod
    CopyRagMetadata,
}

impl Cli {
    /// Repository root for this invocation.
    ///
    /// Blank `--repo-root` values are ignored so an empty `MOBIUS_REPO_ROOT`
    /// falls back to discovery.
    pub fn resolve_repo_root(&self, cwd: &Path) -> PathBuf {
        let explicit = self
            .repo_root
            .as_ref()
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty());
        match explicit {
            Some(path) => absolutize(&cwd.join(path)),
            None => discover_repo_root(cwd).unwrap_or_else(|| cwd.to_path_buf()),
        }
    }
}

fn non_blank(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("module must not be blank".to_string())
    } else {
        Ok(value.to_string())
    }
}
