// src/sheets/database/reader/queries.rs
// Row mapping shared by the reader queries

use rusqlite::Row;
use serde_json::Value;

use crate::sheets::row::{Payload, Sheet, SheetRow};

/// Column list matching [`map_sheet_row`]
pub const ROW_COLUMNS: &str = "id, sheet_id, position, payload, auxiliary, size_hint";

/// Column list matching [`map_sheet`]
pub const SHEET_COLUMNS: &str = "id, name, owner_id, is_active, is_submitted, row_count";

pub fn map_sheet_row(row: &Row<'_>) -> rusqlite::Result<SheetRow> {
    Ok(SheetRow {
        id: row.get(0)?,
        sheet_id: row.get(1)?,
        position: row.get(2)?,
        payload: into_payload(row.get(3)?),
        auxiliary: into_payload(row.get(4)?),
        size_hint: row.get(5)?,
    })
}

pub fn map_sheet(row: &Row<'_>) -> rusqlite::Result<Sheet> {
    Ok(Sheet {
        id: row.get(0)?,
        name: row.get(1)?,
        owner_id: row.get(2)?,
        is_active: row.get(3)?,
        is_submitted: row.get(4)?,
        row_count: row.get(5)?,
    })
}

/// Anything that is not a JSON object reads back as an empty mapping.
fn into_payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}
