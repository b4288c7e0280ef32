//! The copy procedure: reconcile columns, truncate, stream, insert, commit.
//!
//! # Invariants
//! - The destination is only mutated inside one transaction; any error rolls it back.
//! - Destination columns must be a subset of source columns; the destination's
//!   order governs the copy.
//! - Each INSERT statement stays within the bind-parameter limit.

use tracing::{debug, info, warn};

use crate::error::{ReplicateError, Result, Side};
use crate::identifier::TableRef;
use crate::insert::rows_per_statement;
use crate::traits::{DestinationTable, SourceTable};

/// Tuning knobs for a copy. The defaults are what production uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Rows fetched from the source cursor per round trip.
    pub fetch_size: usize,
    /// Rows per INSERT statement, before the parameter-limit cap.
    pub insert_page_size: usize,
    /// Report progress each time the running total crosses a multiple of this.
    pub progress_every: u64,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            fetch_size: 1000,
            insert_page_size: 500,
            progress_every: 5000,
        }
    }
}

/// Observable milestones of a copy, in the order they occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyEvent {
    /// Column lists differ but are compatible. `source_only` columns are not copied.
    SchemaNote { source_only: Vec<String> },
    /// Row counts observed before the truncate.
    Counts {
        source_rows: u64,
        dest_rows_before: u64,
    },
    /// Running total of inserted rows.
    Progress { copied_rows: u64 },
}

/// Outcome of a successful copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub columns: Vec<String>,
    pub source_rows: u64,
    pub dest_rows_before: u64,
    pub copied_rows: u64,
    pub dest_rows_after: u64,
}

/// Choose the columns to copy.
///
/// Returns the destination's list and the source-only columns, or a
/// [`ReplicateError::SchemaMismatch`] naming destination-only columns.
pub fn effective_columns(
    source: &[String],
    destination: &[String],
) -> Result<(Vec<String>, Vec<String>)> {
    if source.is_empty() {
        return Err(ReplicateError::TableMissing { side: Side::Source });
    }
    if destination.is_empty() {
        return Err(ReplicateError::TableMissing {
            side: Side::Destination,
        });
    }

    if source == destination {
        return Ok((destination.to_vec(), Vec::new()));
    }

    let missing_in_source: Vec<String> = destination
        .iter()
        .filter(|c| !source.contains(c))
        .cloned()
        .collect();
    if !missing_in_source.is_empty() {
        return Err(ReplicateError::SchemaMismatch {
            columns: missing_in_source,
        });
    }

    let source_only = source
        .iter()
        .filter(|c| !destination.contains(c))
        .cloned()
        .collect();
    Ok((destination.to_vec(), source_only))
}

/// Replace the destination table's contents with the source table's rows.
///
/// On any error both transactions are rolled back (rollback failures are
/// logged and ignored) and the original error is returned.
pub async fn copy_table<S, D, F>(
    source: &mut S,
    destination: &mut D,
    table: &TableRef,
    options: &CopyOptions,
    mut on_event: F,
) -> Result<CopyReport>
where
    S: SourceTable + ?Sized,
    D: DestinationTable + ?Sized,
    F: FnMut(CopyEvent) + Send,
{
    table.qualified()?;

    match run_copy(source, destination, table, options, &mut on_event).await {
        Ok(report) => Ok(report),
        Err(err) => {
            warn!(table = %table, error = %err, "Copy failed; rolling back");
            if let Err(e) = destination.rollback().await {
                debug!(error = %e, "Destination rollback failed");
            }
            if let Err(e) = source.rollback().await {
                debug!(error = %e, "Source rollback failed");
            }
            Err(err)
        }
    }
}

async fn run_copy<S, D, F>(
    source: &mut S,
    destination: &mut D,
    table: &TableRef,
    options: &CopyOptions,
    on_event: &mut F,
) -> Result<CopyReport>
where
    S: SourceTable + ?Sized,
    D: DestinationTable + ?Sized,
    F: FnMut(CopyEvent) + Send,
{
    source.begin_snapshot().await?;
    destination.begin().await?;

    let source_columns = source.columns(table).await?;
    let dest_columns = destination.columns(table).await?;
    let (columns, source_only) = effective_columns(&source_columns, &dest_columns)?;
    if source_columns != dest_columns {
        info!(source_only = ?source_only, "Schemas differ; copying destination columns");
        on_event(CopyEvent::SchemaNote { source_only });
    }

    let source_rows = source.count_rows(table).await?;
    let dest_rows_before = destination.count_rows(table).await?;
    on_event(CopyEvent::Counts {
        source_rows,
        dest_rows_before,
    });

    destination.truncate(table).await?;
    source.open_stream(table, &columns).await?;

    let page_rows = rows_per_statement(columns.len(), options.insert_page_size);
    let fetch_size = options.fetch_size.max(1);
    let progress_every = options.progress_every.max(1);
    let mut copied: u64 = 0;

    loop {
        let chunk = source.fetch(fetch_size).await?;
        if chunk.is_empty() {
            break;
        }

        for page in chunk.chunks(page_rows) {
            destination.insert_rows(table, &columns, page).await?;
        }

        let before = copied;
        copied += chunk.len() as u64;
        debug!(copied_rows = copied, "Inserted chunk");
        if copied / progress_every > before / progress_every {
            on_event(CopyEvent::Progress {
                copied_rows: copied,
            });
        }
    }

    destination.commit().await?;
    source.commit().await?;
    info!(table = %table, copied_rows = copied, "Copy committed");

    let dest_rows_after = destination.count_rows(table).await?;

    Ok(CopyReport {
        columns,
        source_rows,
        dest_rows_before,
        copied_rows: copied,
        dest_rows_after,
    })
}
