//! Multi-row INSERT statement construction.

use crate::error::Result;
use crate::identifier::quote_column_list;

/// Postgres rejects statements with more bind parameters than this.
pub const MAX_BIND_PARAMETERS: usize = 65_535;

/// Rows per INSERT statement: the requested page size, lowered so
/// `rows * columns` stays within [`MAX_BIND_PARAMETERS`]. Never zero.
pub fn rows_per_statement(column_count: usize, requested: usize) -> usize {
    let by_params = MAX_BIND_PARAMETERS / column_count.max(1);
    requested.min(by_params).max(1)
}

/// `INSERT INTO <table> ("a", "b") VALUES ($1::text::<type_a>, $2::text::<type_b>), ...`
///
/// `column_types` are destination type names from `format_type` and are
/// trusted catalog output; `qualified_table` is already quoted.
pub fn build_insert(
    qualified_table: &str,
    columns: &[String],
    column_types: &[String],
    row_count: usize,
) -> Result<String> {
    let column_list = quote_column_list(columns)?;

    let mut sql = format!("INSERT INTO {qualified_table} ({column_list}) VALUES ");
    let mut param = 1usize;
    for row in 0..row_count {
        if row > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for (i, ty) in column_types.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("${param}::text::{ty}"));
            param += 1;
        }
        sql.push(')');
    }
    Ok(sql)
}
