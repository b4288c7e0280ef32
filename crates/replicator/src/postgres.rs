//! Postgres implementations of [`SourceTable`] and [`DestinationTable`].
//!
//! Values travel as text: the source selects `"col"::text` and the destination
//! casts each parameter back with `$n::text::<declared type>`.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio_postgres::config::SslMode;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config as PgConfig, NoTls};
use tracing::{debug, info};

use crate::copy::{CopyEvent, CopyOptions, CopyReport, copy_table};
use crate::error::{ReplicateError, Result, Side};
use crate::identifier::{TableRef, quote_ident};
use crate::insert::build_insert;
use crate::tls::unverified_connector;
use crate::traits::{DestinationTable, Row, SourceTable};

const CURSOR_NAME: &str = "src_stream";

const COLUMNS_SQL: &str = "
    SELECT c.column_name::text, format_type(a.atttypid, a.atttypmod)
    FROM information_schema.columns c
    JOIN pg_catalog.pg_namespace n ON n.nspname = c.table_schema
    JOIN pg_catalog.pg_class t ON t.relnamespace = n.oid AND t.relname = c.table_name
    JOIN pg_catalog.pg_attribute a ON a.attrelid = t.oid AND a.attname = c.column_name
    WHERE c.table_schema = $1 AND c.table_name = $2
    ORDER BY c.ordinal_position
";

/// Open a connection and spawn its driver task on the current runtime.
///
/// The driver ends when the returned [`Client`] is dropped.
pub async fn connect(url: &SecretString, side: Side) -> Result<Client> {
    let config: PgConfig = url.expose_secret().parse().map_err(|_| {
        ReplicateError::Config(format!(
            "{side} connection string is not a valid Postgres URL or key=value string"
        ))
    })?;

    let client = match config.get_ssl_mode() {
        SslMode::Disable => {
            let (client, connection) = config
                .connect(NoTls)
                .await
                .map_err(|source| ReplicateError::Connect { side, source })?;
            spawn_driver(connection, side);
            client
        }
        _ => {
            let (client, connection) = config
                .connect(unverified_connector()?)
                .await
                .map_err(|source| ReplicateError::Connect { side, source })?;
            spawn_driver(connection, side);
            client
        }
    };

    info!(side = %side, "Connected to Postgres");
    Ok(client)
}

fn spawn_driver<F>(connection: F, side: Side)
where
    F: std::future::Future<Output = std::result::Result<(), tokio_postgres::Error>>
        + Send
        + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!(side = %side, error = %e, "Postgres connection closed with error");
        }
    });
}

async fn column_types(client: &Client, table: &TableRef) -> Result<Vec<(String, String)>> {
    let rows = client
        .query(COLUMNS_SQL, &[&table.schema, &table.name])
        .await?;
    rows.iter()
        .map(|row| Ok((row.try_get::<_, String>(0)?, row.try_get::<_, String>(1)?)))
        .collect()
}

async fn count_rows(client: &Client, table: &TableRef) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.qualified()?);
    let row = client.query_one(&sql, &[]).await?;
    let count: i64 = row.try_get(0)?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Read side backed by a Postgres connection.
pub struct PgSource {
    client: Client,
    streaming: bool,
}

impl PgSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            streaming: false,
        }
    }

    pub async fn connect(url: &SecretString) -> Result<Self> {
        Ok(Self::new(connect(url, Side::Source).await?))
    }
}

#[async_trait]
impl SourceTable for PgSource {
    async fn begin_snapshot(&mut self) -> Result<()> {
        self.client
            .batch_execute("BEGIN ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .await?;
        Ok(())
    }

    async fn columns(&mut self, table: &TableRef) -> Result<Vec<String>> {
        Ok(column_types(&self.client, table)
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    async fn count_rows(&mut self, table: &TableRef) -> Result<u64> {
        count_rows(&self.client, table).await
    }

    async fn open_stream(&mut self, table: &TableRef, columns: &[String]) -> Result<()> {
        let select_list = columns
            .iter()
            .map(|c| quote_ident(c).map(|q| format!("{q}::text")))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let sql = format!(
            "DECLARE {CURSOR_NAME} NO SCROLL CURSOR FOR SELECT {select_list} FROM {}",
            table.qualified()?
        );
        self.client.batch_execute(&sql).await?;
        self.streaming = true;
        debug!(table = %table, columns = columns.len(), "Opened source cursor");
        Ok(())
    }

    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<Row>> {
        if !self.streaming {
            return Ok(Vec::new());
        }
        let sql = format!("FETCH FORWARD {max_rows} FROM {CURSOR_NAME}");
        let rows = self.client.query(&sql, &[]).await?;
        if rows.is_empty() {
            self.client
                .batch_execute(&format!("CLOSE {CURSOR_NAME}"))
                .await?;
            self.streaming = false;
        }
        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| Ok(row.try_get::<_, Option<String>>(i)?))
                    .collect::<Result<Row>>()
            })
            .collect()
    }

    async fn commit(&mut self) -> Result<()> {
        self.client.batch_execute("COMMIT").await?;
        self.streaming = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.streaming = false;
        self.client.batch_execute("ROLLBACK").await?;
        Ok(())
    }
}

/// Write side backed by a Postgres connection.
pub struct PgDestination {
    client: Client,
    types: HashMap<String, String>,
}

impl PgDestination {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            types: HashMap::new(),
        }
    }

    pub async fn connect(url: &SecretString) -> Result<Self> {
        Ok(Self::new(connect(url, Side::Destination).await?))
    }

    fn declared_types(&self, columns: &[String]) -> Result<Vec<String>> {
        columns
            .iter()
            .map(|c| {
                self.types.get(c).cloned().ok_or_else(|| {
                    ReplicateError::Config(format!("no declared type known for column {c:?}"))
                })
            })
            .collect()
    }
}

#[async_trait]
impl DestinationTable for PgDestination {
    async fn begin(&mut self) -> Result<()> {
        self.client.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn columns(&mut self, table: &TableRef) -> Result<Vec<String>> {
        let columns = column_types(&self.client, table).await?;
        self.types = columns.iter().cloned().collect();
        Ok(columns.into_iter().map(|(name, _)| name).collect())
    }

    async fn count_rows(&mut self, table: &TableRef) -> Result<u64> {
        count_rows(&self.client, table).await
    }

    async fn truncate(&mut self, table: &TableRef) -> Result<()> {
        let sql = format!("TRUNCATE TABLE {}", table.qualified()?);
        self.client.batch_execute(&sql).await?;
        info!(table = %table, "Truncated destination table");
        Ok(())
    }

    async fn insert_rows(
        &mut self,
        table: &TableRef,
        columns: &[String],
        rows: &[Row],
    ) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let types = self.declared_types(columns)?;
        let sql = build_insert(&table.qualified()?, columns, &types, rows.len())?;
        let params: Vec<&(dyn ToSql + Sync)> = rows
            .iter()
            .flat_map(|row| row.iter().map(|v| v as &(dyn ToSql + Sync)))
            .collect();
        Ok(self.client.execute(&sql, &params).await?)
    }

    async fn commit(&mut self) -> Result<()> {
        self.client.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.client.batch_execute("ROLLBACK").await?;
        Ok(())
    }
}

/// Connect to both databases and copy `table` from source to destination.
///
/// Both connections are closed on return, whatever the outcome.
pub async fn copy_between<F>(
    source_url: &SecretString,
    destination_url: &SecretString,
    table: &TableRef,
    options: &CopyOptions,
    on_event: F,
) -> Result<CopyReport>
where
    F: FnMut(CopyEvent) + Send,
{
    table.qualified()?;
    let mut source = PgSource::connect(source_url).await?;
    let mut destination = PgDestination::connect(destination_url).await?;
    copy_table(&mut source, &mut destination, table, options, on_event).await
}
