//! One-shot table replication between two Postgres databases.
//!
//! The destination table is truncated and reloaded from the source inside a
//! single destination transaction, so a failed run leaves it untouched. The
//! algorithm in [`copy`] is written against the [`SourceTable`] and
//! [`DestinationTable`] traits; [`postgres`] provides the real implementations.

pub mod copy;
pub mod error;
pub mod identifier;
pub mod insert;
pub mod postgres;
mod tls;
pub mod traits;

pub use copy::{CopyEvent, CopyOptions, CopyReport, copy_table, effective_columns};
pub use error::{ReplicateError, Result, Side, describe_pg_error};
pub use identifier::TableRef;
pub use postgres::{PgDestination, PgSource, copy_between};
pub use traits::{DestinationTable, Row, SourceTable};

/// Schema of the replicated table.
pub const RAG_METADATA_SCHEMA: &str = "public";

/// The table `mobius-ops copy-rag-metadata` replicates.
pub const RAG_METADATA_TABLE: &str = "published_rag_metadata";

/// `public.published_rag_metadata`.
pub fn rag_metadata_table() -> TableRef {
    TableRef::new(RAG_METADATA_SCHEMA, RAG_METADATA_TABLE)
}
