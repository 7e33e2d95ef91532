// src/sheets/database/writer/insertions.rs
// Insertion operations - new sheets and new rows

use super::super::error::DbResult;
use super::super::schema::{ROWS_TABLE, SHEETS_TABLE};
use super::helpers::{now_timestamp, quote_identifier};
use crate::sheets::row::{NewRow, RowId, SheetId};
use rusqlite::{params, Connection};
use serde_json::Value;

/// Create an empty, active, unsubmitted sheet
pub fn create_sheet(conn: &Connection, name: &str, owner_id: i64) -> DbResult<SheetId> {
    let now = now_timestamp();
    conn.execute(
        &format!(
            "INSERT INTO {} (name, owner_id, row_count, created_at, updated_at) VALUES (?, ?, 0, ?, ?)",
            quote_identifier(SHEETS_TABLE)
        ),
        params![name, owner_id, now, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a new row at an explicit position.
/// Note: Caller must ensure the position is free within the sheet.
pub fn create_row(
    conn: &Connection,
    sheet_id: SheetId,
    position: u32,
    row: &NewRow,
) -> DbResult<RowId> {
    let now = now_timestamp();
    conn.execute(
        &format!(
            "INSERT INTO {} (sheet_id, position, payload, auxiliary, size_hint, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            quote_identifier(ROWS_TABLE)
        ),
        params![
            sheet_id,
            position,
            Value::Object(row.payload.clone()),
            Value::Object(row.auxiliary.clone()),
            row.size_hint,
            now,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
