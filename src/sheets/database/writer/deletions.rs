// src/sheets/database/writer/deletions.rs
// Deletion operations - removing rows by stable id

use super::super::error::DbResult;
use super::super::schema::ROWS_TABLE;
use super::helpers::{build_delete_sql, build_in_clause, prepare_params_with_ids};
use crate::sheets::row::{RowId, SheetId};
use rusqlite::{params_from_iter, Connection, ToSql};

/// Upper bound on bound parameters per statement
const DELETE_CHUNK: usize = 500;

/// Delete rows of one sheet by id. Ids from other sheets are left alone.
/// No compaction here; positions are renumbered by the caller afterwards.
pub fn delete_rows(conn: &Connection, sheet_id: SheetId, ids: &[RowId]) -> DbResult<usize> {
    let mut deleted = 0;
    for chunk in ids.chunks(DELETE_CHUNK) {
        let where_clause = format!("sheet_id = ? AND {}", build_in_clause("id", chunk.len()));
        let sql = build_delete_sql(ROWS_TABLE, &where_clause);
        let initial: Vec<Box<dyn ToSql>> = vec![Box::new(sheet_id)];
        let params = prepare_params_with_ids(initial, chunk);
        deleted += conn.execute(&sql, params_from_iter(params.iter()))?;
    }
    Ok(deleted)
}
