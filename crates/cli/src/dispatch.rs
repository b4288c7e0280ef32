//! Command dispatch logic.
//!
//! Responsibilities:
//! - Resolve the repository root once for every command.
//! - Route parsed CLI arguments to the command handlers.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).

use anyhow::{Context, Result};

use crate::args::{Cli, Commands};
use crate::commands;

/// Dispatch CLI commands to their respective handlers.
pub(crate) async fn run_command(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
    let repo_root = cli.resolve_repo_root(&cwd);
    tracing::debug!(repo_root = %repo_root.display(), "Resolved repository root");

    match cli.command {
        Commands::Doctor {
            module,
            verify_vertex,
        } => {
            let options = commands::doctor::DoctorOptions {
                module,
                verify_vertex,
            };
            commands::doctor::run(&repo_root, &options).await?;
        }
        Commands::CopyRagMetadata => {
            commands::copy_rag_metadata::run(&repo_root).await?;
        }
    }

    Ok(())
}
