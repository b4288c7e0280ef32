//! Seams between the copy algorithm and the databases it talks to.
//!
//! - [`SourceTable`]: a read-only snapshot that can list columns, count and stream rows
//! - [`DestinationTable`]: a transactional target that can truncate and insert

use async_trait::async_trait;

use crate::error::Result;
use crate::identifier::TableRef;

/// One row in Postgres text representation; `None` is SQL NULL.
pub type Row = Vec<Option<String>>;

/// Read side of a copy.
///
/// All calls between [`SourceTable::begin_snapshot`] and
/// [`SourceTable::commit`] observe the same snapshot.
#[async_trait]
pub trait SourceTable: Send {
    /// Start a read-only, repeatable-read transaction.
    async fn begin_snapshot(&mut self) -> Result<()>;

    /// Column names in ordinal order. Empty if the table does not exist.
    async fn columns(&mut self, table: &TableRef) -> Result<Vec<String>>;

    async fn count_rows(&mut self, table: &TableRef) -> Result<u64>;

    /// Open a server-side cursor over `columns` of `table`.
    async fn open_stream(&mut self, table: &TableRef, columns: &[String]) -> Result<()>;

    /// Next chunk of at most `max_rows` rows. An empty chunk means the stream is drained.
    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<Row>>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}

/// Write side of a copy.
///
/// Everything between [`DestinationTable::begin`] and
/// [`DestinationTable::commit`] is one transaction.
#[async_trait]
pub trait DestinationTable: Send {
    async fn begin(&mut self) -> Result<()>;

    /// Column names in ordinal order. Empty if the table does not exist.
    async fn columns(&mut self, table: &TableRef) -> Result<Vec<String>>;

    async fn count_rows(&mut self, table: &TableRef) -> Result<u64>;

    async fn truncate(&mut self, table: &TableRef) -> Result<()>;

    /// Insert `rows` (each ordered like `columns`) as one statement.
    ///
    /// Callers keep `rows.len() * columns.len()` within the bind-parameter limit.
    async fn insert_rows(
        &mut self,
        table: &TableRef,
        columns: &[String],
        rows: &[Row],
    ) -> Result<u64>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}
