// src/sheets/database/writer/updates.rs
// Update operations - row positions, row fields and sheet aggregates

use super::super::error::{DbError, DbResult};
use super::super::schema::{ROWS_TABLE, SHEETS_TABLE};
use super::helpers::{build_update_sql, now_timestamp};
use crate::sheets::row::{RowId, RowPatch, SheetId};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use serde_json::Value;

/// Move one row to a new position.
/// Note: Caller must ensure the target slot is free.
pub fn update_row_position(conn: &Connection, id: RowId, new_position: u32) -> DbResult<()> {
    let sql = build_update_sql(ROWS_TABLE, &["position"], "id = ?");
    let changed = conn.execute(&sql, params![new_position, id])?;
    if changed == 0 {
        return Err(DbError::RowNotFound(id));
    }
    Ok(())
}

/// Write the present fields of `patch` onto the row. Position is never touched.
pub fn update_row_fields(conn: &Connection, id: RowId, patch: &RowPatch) -> DbResult<()> {
    let mut columns: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(payload) = &patch.payload {
        columns.push("payload");
        values.push(Box::new(Value::Object(payload.clone())));
    }
    if let Some(auxiliary) = &patch.auxiliary {
        columns.push("auxiliary");
        values.push(Box::new(Value::Object(auxiliary.clone())));
    }
    if let Some(size_hint) = patch.size_hint {
        columns.push("size_hint");
        values.push(Box::new(size_hint));
    }
    if columns.is_empty() {
        return Ok(());
    }

    columns.push("updated_at");
    values.push(Box::new(now_timestamp()));
    values.push(Box::new(id));

    let sql = build_update_sql(ROWS_TABLE, &columns, "id = ?");
    let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
    if changed == 0 {
        return Err(DbError::RowNotFound(id));
    }
    Ok(())
}

/// Persist the cached row count of a sheet
pub fn update_sheet_row_count(conn: &Connection, sheet_id: SheetId, count: u32) -> DbResult<()> {
    let sql = build_update_sql(SHEETS_TABLE, &["row_count", "updated_at"], "id = ?");
    let changed = conn.execute(&sql, params![count, now_timestamp(), sheet_id])?;
    if changed == 0 {
        return Err(DbError::SheetNotFound(sheet_id));
    }
    Ok(())
}

/// Lock or unlock a sheet for its owner
pub fn set_sheet_submitted(conn: &Connection, sheet_id: SheetId, submitted: bool) -> DbResult<()> {
    let now = now_timestamp();
    let submitted_at = submitted.then(|| now.clone());
    let sql = build_update_sql(
        SHEETS_TABLE,
        &["is_submitted", "submitted_at", "updated_at"],
        "id = ?",
    );
    let changed = conn.execute(&sql, params![submitted, submitted_at, now, sheet_id])?;
    if changed == 0 {
        return Err(DbError::SheetNotFound(sheet_id));
    }
    Ok(())
}
