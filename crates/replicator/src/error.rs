//! Error types for the table replicator.

use std::fmt;

use thiserror::Error;

/// Result type alias for replicator operations.
pub type Result<T> = std::result::Result<T, ReplicateError>;

/// Which end of the copy an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("Source"),
            Self::Destination => f.write_str("Destination"),
        }
    }
}

/// Errors raised while copying a table.
///
/// Connection strings never appear in any message.
#[derive(Error, Debug)]
pub enum ReplicateError {
    /// Missing or unusable configuration (connection strings, TLS setup).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The catalog reports no columns for the table.
    #[error("{side} table has no columns (table missing?)")]
    TableMissing { side: Side },

    /// The destination has columns the source cannot supply.
    #[error(
        "Schema mismatch: destination has columns not present in source: {}",
        columns.join(", ")
    )]
    SchemaMismatch { columns: Vec<String> },

    /// An identifier failed validation before being interpolated into SQL.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A statement failed.
    #[error("Database error: {}", describe_pg_error(.0))]
    Database(#[from] tokio_postgres::Error),

    /// Opening a connection failed.
    #[error("Could not connect to {side} database: {}", describe_pg_error(.source))]
    Connect {
        side: Side,
        #[source]
        source: tokio_postgres::Error,
    },
}

/// Server-side explanation of a driver error.
///
/// The driver's own Display is a bare category such as `db error`; the server
/// message, detail and constraint live in the attached `DbError`. Other
/// errors get their source chain appended.
pub fn describe_pg_error(err: &tokio_postgres::Error) -> String {
    if let Some(db) = err.as_db_error() {
        let mut message = format!("{} (SQLSTATE {})", db.message(), db.code().code());
        if let Some(detail) = db.detail() {
            message.push_str(&format!("; detail: {detail}"));
        }
        if let Some(constraint) = db.constraint() {
            message.push_str(&format!("; constraint: {constraint}"));
        }
        return message;
    }

    let mut message = err.to_string();
    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}

impl ReplicateError {
    /// Check if this error was raised before touching any database.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidIdentifier(_))
    }

    /// Check if this error is a schema incompatibility between the two tables.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::TableMissing { .. } | Self::SchemaMismatch { .. })
    }
}
