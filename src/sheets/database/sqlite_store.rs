// src/sheets/database/sqlite_store.rs
// RowStore over one SQLite connection or transaction

use rusqlite::Connection;

use super::error::DbResult;
use super::reader::DbReader;
use super::writer::DbWriter;
use crate::sheets::row::{NewRow, RowId, RowPatch, SheetId, SheetRow};
use crate::sheets::store::RowStore;

/// Row store backed by SQLite.
///
/// Borrow it from a `Transaction` so that a whole batch commits or rolls back
/// together; the store itself never commits.
pub struct SqliteRowStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteRowStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl RowStore for SqliteRowStore<'_> {
    fn get_rows_ordered(&mut self, sheet_id: SheetId) -> DbResult<Vec<SheetRow>> {
        DbReader::get_rows_ordered(self.conn, sheet_id)
    }

    fn get_rows_by_id(&mut self, sheet_id: SheetId, ids: &[RowId]) -> DbResult<Vec<SheetRow>> {
        DbReader::get_rows_by_id(self.conn, sheet_id, ids)
    }

    fn create_row(&mut self, sheet_id: SheetId, position: u32, row: &NewRow) -> DbResult<RowId> {
        DbWriter::create_row(self.conn, sheet_id, position, row)
    }

    fn update_row_position(&mut self, id: RowId, new_position: u32) -> DbResult<()> {
        DbWriter::update_row_position(self.conn, id, new_position)
    }

    fn delete_rows(&mut self, sheet_id: SheetId, ids: &[RowId]) -> DbResult<usize> {
        DbWriter::delete_rows(self.conn, sheet_id, ids)
    }

    fn update_row_fields(&mut self, id: RowId, patch: &RowPatch) -> DbResult<()> {
        DbWriter::update_row_fields(self.conn, id, patch)
    }

    fn update_collection_row_count(&mut self, sheet_id: SheetId, count: u32) -> DbResult<()> {
        DbWriter::update_sheet_row_count(self.conn, sheet_id, count)
    }

    fn max_position(&mut self, sheet_id: SheetId) -> DbResult<u32> {
        DbReader::max_position(self.conn, sheet_id)
    }
}
