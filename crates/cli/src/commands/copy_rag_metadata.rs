//! Copy `published_rag_metadata` from the production chat database to dev.
//!
//! Responsibilities:
//! - Read both connection strings from the `mobius-chat` module environment.
//! - Run the replicator and print its progress.
//!
//! Invariants:
//! - Connection strings are never printed or logged.
//! - Missing connection strings fail before any connection is opened.

use std::path::Path;

use anyhow::{Context, Result};
use mobius_config::EnvLoader;
use mobius_config::constants::{CHAT_MODULE_DIR, CHAT_RAG_DATABASE_URL, PROD_CHAT_DATABASE_URL};
use mobius_replicator::{CopyEvent, CopyOptions, RAG_METADATA_TABLE, copy_between, rag_metadata_table};
use secrecy::SecretString;

use crate::error::CliError;

/// Run the copy with production options.
pub async fn run(repo_root: &Path) -> Result<()> {
    let module_root = repo_root.join(CHAT_MODULE_DIR);
    let env = EnvLoader::new(&module_root)
        .load()
        .context("Failed to load mobius-chat environment")?;

    let source_url = SecretString::from(env.require(PROD_CHAT_DATABASE_URL)?.to_string());
    let destination_url = SecretString::from(env.require(CHAT_RAG_DATABASE_URL)?.to_string());

    println!("Copying {RAG_METADATA_TABLE}: prod -> dev");
    let report = copy_between(
        &source_url,
        &destination_url,
        &rag_metadata_table(),
        &CopyOptions::default(),
        print_event,
    )
    .await
    .map_err(CliError::CopyFailed)?;

    println!("- copied_rows_total={}", report.copied_rows);
    println!("- dest_rows_after={}", report.dest_rows_after);
    Ok(())
}

fn print_event(event: CopyEvent) {
    println!("{}", event_lines(&event));
}

/// Report lines for one copy event.
fn event_lines(event: &CopyEvent) -> String {
    match event {
        CopyEvent::SchemaNote { source_only } => {
            tracing::info!(skipped = ?source_only, "Source-only columns are not copied");
            "NOTE: schema differs; copying intersection columns in dev order.".to_string()
        }
        CopyEvent::Counts {
            source_rows,
            dest_rows_before,
        } => format!("- source_rows={source_rows}\n- dest_rows_before={dest_rows_before}"),
        CopyEvent::Progress { copied_rows } => format!("- copied_rows={copied_rows}"),
    }
}
