// src/sheets/store/mod.rs
// Row store seam consumed by the reconciler

#[cfg(test)]
mod memory;

#[cfg(test)]
pub(crate) use memory::{MemoryRowStore, StoreWrite};

use super::database::error::DbResult;
use super::row::{NewRow, RowId, RowPatch, SheetId, SheetRow};

/// Durable ordered-row storage for one transaction scope.
///
/// Every call made during a batch participates in the same transaction; the
/// caller owns commit and rollback. Implementations must reject any write that
/// would place two rows of one sheet at the same position.
pub trait RowStore {
    /// All rows of the sheet ordered by position ascending.
    fn get_rows_ordered(&mut self, sheet_id: SheetId) -> DbResult<Vec<SheetRow>>;

    /// Rows of the sheet whose id is in `ids`. Unknown ids are simply absent.
    fn get_rows_by_id(&mut self, sheet_id: SheetId, ids: &[RowId]) -> DbResult<Vec<SheetRow>>;

    fn create_row(&mut self, sheet_id: SheetId, position: u32, row: &NewRow) -> DbResult<RowId>;

    fn update_row_position(&mut self, id: RowId, new_position: u32) -> DbResult<()>;

    /// Delete rows of the sheet by id, returning how many were removed.
    fn delete_rows(&mut self, sheet_id: SheetId, ids: &[RowId]) -> DbResult<usize>;

    fn update_row_fields(&mut self, id: RowId, patch: &RowPatch) -> DbResult<()>;

    fn update_collection_row_count(&mut self, sheet_id: SheetId, count: u32) -> DbResult<()>;

    /// Highest position currently held in the sheet, 0 when empty.
    fn max_position(&mut self, sheet_id: SheetId) -> DbResult<u32> {
        Ok(self
            .get_rows_ordered(sheet_id)?
            .last()
            .map(|row| row.position)
            .unwrap_or(0))
    }
}
