//! Identifier validation and quoting for SQL built at runtime.
//!
//! Identifiers cannot be bound as statement parameters, so every schema,
//! table and column name is validated and double-quoted before it is
//! interpolated.

use crate::error::{ReplicateError, Result};

/// PostgreSQL truncates identifiers longer than this many bytes.
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Reject empty names, NUL bytes and names Postgres would truncate.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ReplicateError::InvalidIdentifier(
            "identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(ReplicateError::InvalidIdentifier(format!(
            "identifier contains a null byte: {name:?}"
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ReplicateError::InvalidIdentifier(format!(
            "identifier exceeds {MAX_IDENTIFIER_LENGTH} bytes (got {}): {name:?}",
            name.len()
        )));
    }

    Ok(())
}

/// Quote a PostgreSQL identifier, doubling embedded double quotes.
pub fn quote_ident(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// A schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// `"schema"."table"`, validated and quoted.
    pub fn qualified(&self) -> Result<String> {
        Ok(format!(
            "{}.{}",
            quote_ident(&self.schema)?,
            quote_ident(&self.name)?
        ))
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Comma-separated quoted column list.
pub fn quote_column_list(columns: &[String]) -> Result<String> {
    let quoted = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Result<Vec<_>>>()?;
    Ok(quoted.join(", "))
}
