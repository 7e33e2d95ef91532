// src/sheets/database/writer/helpers.rs
// Helper functions for SQL generation and parameter preparation

use rusqlite::ToSql;

/// Quote a SQL identifier by wrapping it in double quotes.
///
/// # Example
/// ```
/// # use sheetrows::sheets::database::writer::helpers::quote_identifier;
/// let quoted = quote_identifier("sheet_rows");
/// assert_eq!(quoted, "\"sheet_rows\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Build a string of SQL placeholders (?, ?, ?, ...).
///
/// # Example
/// ```
/// # use sheetrows::sheets::database::writer::helpers::build_placeholders;
/// assert_eq!(build_placeholders(3), "?, ?, ?");
/// ```
pub fn build_placeholders(count: usize) -> String {
    (0..count).map(|_| "?").collect::<Vec<_>>().join(", ")
}

/// Build an UPDATE statement that sets each of `columns` to a placeholder.
///
/// # Example
/// ```
/// # use sheetrows::sheets::database::writer::helpers::build_update_sql;
/// let sql = build_update_sql("sheet_rows", &["payload", "updated_at"], "id = ?");
/// assert_eq!(sql, "UPDATE \"sheet_rows\" SET \"payload\" = ?, \"updated_at\" = ? WHERE id = ?");
/// ```
pub fn build_update_sql(table_name: &str, columns: &[&str], where_clause: &str) -> String {
    let assignments = columns
        .iter()
        .map(|col| format!("{} = ?", quote_identifier(col)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE {}",
        quote_identifier(table_name),
        assignments,
        where_clause
    )
}

/// Build a DELETE SQL statement.
///
/// # Example
/// ```
/// # use sheetrows::sheets::database::writer::helpers::build_delete_sql;
/// let sql = build_delete_sql("sheet_rows", "id = ?");
/// assert_eq!(sql, "DELETE FROM \"sheet_rows\" WHERE id = ?");
/// ```
pub fn build_delete_sql(table_name: &str, where_clause: &str) -> String {
    format!(
        "DELETE FROM {} WHERE {}",
        quote_identifier(table_name),
        where_clause
    )
}

/// Build an `IN (...)` clause for `count` bound values.
pub fn build_in_clause(column: &str, count: usize) -> String {
    format!("{} IN ({})", column, build_placeholders(count))
}

/// Current time in the format stored in `created_at`/`updated_at` columns.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Box a leading parameter followed by a list of ids.
pub fn prepare_params_with_ids(initial: Vec<Box<dyn ToSql>>, ids: &[i64]) -> Vec<Box<dyn ToSql>> {
    let mut params = initial;
    for id in ids {
        params.push(Box::new(*id));
    }
    params
}
