// src/sheets/database/writer/mod.rs
// Main writer module - orchestrates all database write operations

mod deletions;
pub mod helpers;
mod insertions;
#[cfg(test)]
pub(crate) mod test_helpers;
mod updates;

use super::error::DbResult;
use crate::sheets::row::{NewRow, RowId, RowPatch, SheetId};
use rusqlite::Connection;

/// Database writer - provides all write operations
///
/// This struct delegates to specialized modules:
/// - `insertions`: sheet and row creation
/// - `updates`: row positions, row fields, sheet aggregates
/// - `deletions`: row removal by id
///
/// Every function takes a plain `&Connection`; pass a `Transaction` (which
/// derefs to one) to group writes atomically.
pub struct DbWriter;

impl DbWriter {
    // ============================================================================
    // INSERTIONS - See insertions.rs
    // ============================================================================

    /// Create an empty sheet owned by `owner_id`
    pub fn create_sheet(conn: &Connection, name: &str, owner_id: i64) -> DbResult<SheetId> {
        insertions::create_sheet(conn, name, owner_id)
    }

    /// Insert a new row at an explicit position
    pub fn create_row(
        conn: &Connection,
        sheet_id: SheetId,
        position: u32,
        row: &NewRow,
    ) -> DbResult<RowId> {
        insertions::create_row(conn, sheet_id, position, row)
    }

    // ============================================================================
    // UPDATES - See updates.rs
    // ============================================================================

    /// Move one row to a new position
    pub fn update_row_position(conn: &Connection, id: RowId, new_position: u32) -> DbResult<()> {
        updates::update_row_position(conn, id, new_position)
    }

    /// Write the present fields of a partial row update
    pub fn update_row_fields(conn: &Connection, id: RowId, patch: &RowPatch) -> DbResult<()> {
        updates::update_row_fields(conn, id, patch)
    }

    /// Persist a sheet's cached row count
    pub fn update_sheet_row_count(conn: &Connection, sheet_id: SheetId, count: u32) -> DbResult<()> {
        updates::update_sheet_row_count(conn, sheet_id, count)
    }

    /// Mark a sheet as submitted (locked) or reopen it
    pub fn set_sheet_submitted(conn: &Connection, sheet_id: SheetId, submitted: bool) -> DbResult<()> {
        updates::set_sheet_submitted(conn, sheet_id, submitted)
    }

    // ============================================================================
    // DELETIONS - See deletions.rs
    // ============================================================================

    /// Delete rows of one sheet by id
    pub fn delete_rows(conn: &Connection, sheet_id: SheetId, ids: &[RowId]) -> DbResult<usize> {
        deletions::delete_rows(conn, sheet_id, ids)
    }
}
