// src/sheets/database/reader/mod.rs
mod queries;

use super::error::DbResult;
use super::schema::{ROWS_TABLE, SHEETS_TABLE};
use super::writer::helpers::{build_in_clause, prepare_params_with_ids};
use crate::sheets::row::{RowId, Sheet, SheetId, SheetRow};
use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql};

pub use queries::{map_sheet, map_sheet_row, ROW_COLUMNS, SHEET_COLUMNS};

/// Upper bound on ids bound into one `IN (...)` lookup
const LOOKUP_CHUNK: usize = 500;

pub struct DbReader;

impl DbReader {
    /// Load one sheet header
    pub fn get_sheet(conn: &Connection, sheet_id: SheetId) -> DbResult<Option<Sheet>> {
        let sheet = conn
            .query_row(
                &format!("SELECT {} FROM \"{}\" WHERE id = ?", SHEET_COLUMNS, SHEETS_TABLE),
                [sheet_id],
                map_sheet,
            )
            .optional()?;
        Ok(sheet)
    }

    /// All sheets, oldest first
    pub fn list_sheets(conn: &Connection) -> DbResult<Vec<Sheet>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM \"{}\" ORDER BY id",
            SHEET_COLUMNS, SHEETS_TABLE
        ))?;
        let sheets = stmt
            .query_map([], map_sheet)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sheets)
    }

    /// Rows of a sheet ordered by position ascending
    pub fn get_rows_ordered(conn: &Connection, sheet_id: SheetId) -> DbResult<Vec<SheetRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM \"{}\" WHERE sheet_id = ? ORDER BY position, id",
            ROW_COLUMNS, ROWS_TABLE
        ))?;
        let rows = stmt
            .query_map([sheet_id], map_sheet_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Rows of a sheet with the given ids. Missing ids are not an error.
    pub fn get_rows_by_id(
        conn: &Connection,
        sheet_id: SheetId,
        ids: &[RowId],
    ) -> DbResult<Vec<SheetRow>> {
        let mut rows = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(LOOKUP_CHUNK) {
            let sql = format!(
                "SELECT {} FROM \"{}\" WHERE sheet_id = ? AND {} ORDER BY position",
                ROW_COLUMNS,
                ROWS_TABLE,
                build_in_clause("id", chunk.len())
            );
            let initial: Vec<Box<dyn ToSql>> = vec![Box::new(sheet_id)];
            let params = prepare_params_with_ids(initial, chunk);
            let mut stmt = conn.prepare(&sql)?;
            let found = stmt
                .query_map(params_from_iter(params.iter()), map_sheet_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.extend(found);
        }
        Ok(rows)
    }

    /// Highest position in the sheet, 0 when it has no rows
    pub fn max_position(conn: &Connection, sheet_id: SheetId) -> DbResult<u32> {
        let max: u32 = conn.query_row(
            &format!(
                "SELECT COALESCE(MAX(position), 0) FROM \"{}\" WHERE sheet_id = ?",
                ROWS_TABLE
            ),
            [sheet_id],
            |row| row.get(0),
        )?;
        Ok(max)
    }
}
