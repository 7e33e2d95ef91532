// src/sheets/database/writer/test_helpers.rs
// Test utilities for database writer tests

#![cfg(test)]

use rusqlite::{params, Connection};

use crate::sheets::database::DbConnection;
use crate::sheets::row::{RowId, SheetId};

/// Open an in-memory database with the full schema.
///
/// # Example
/// ```ignore
/// let conn = setup_db();
/// let (sheet, ids) = seed_sheet(&conn, 1, 5);
/// ```
pub fn setup_db() -> Connection {
    DbConnection::open_in_memory().unwrap()
}

/// Create a sheet owned by `owner_id` holding `count` rows at positions
/// `1..=count`, each with payload `{"n": <position>}`.
///
/// Rows are written with plain SQL so writer tests do not depend on the
/// code under test for their fixtures.
pub fn seed_sheet(conn: &Connection, owner_id: i64, count: u32) -> (SheetId, Vec<RowId>) {
    conn.execute(
        "INSERT INTO sheets (name, owner_id, row_count, created_at, updated_at)
         VALUES ('Seeded', ?, ?, '', '')",
        params![owner_id, count],
    )
    .unwrap();
    let sheet_id = conn.last_insert_rowid();

    let mut ids = Vec::with_capacity(count as usize);
    for position in 1..=count {
        conn.execute(
            "INSERT INTO sheet_rows (sheet_id, position, payload, created_at, updated_at)
             VALUES (?, ?, json_object('n', ?), '', '')",
            params![sheet_id, position, position],
        )
        .unwrap();
        ids.push(conn.last_insert_rowid());
    }
    (sheet_id, ids)
}

/// Positions of a sheet's rows, ascending.
pub fn positions_of(conn: &Connection, sheet_id: SheetId) -> Vec<u32> {
    let mut stmt = conn
        .prepare("SELECT position FROM sheet_rows WHERE sheet_id = ? ORDER BY position")
        .unwrap();
    stmt.query_map([sheet_id], |r| r.get(0))
        .unwrap()
        .collect::<Result<Vec<u32>, _>>()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_sheet_creates_contiguous_rows() {
        let conn = setup_db();
        let (sheet, ids) = seed_sheet(&conn, 7, 4);

        assert_eq!(ids.len(), 4);
        assert_eq!(positions_of(&conn, sheet), vec![1, 2, 3, 4]);

        let owner: i64 = conn
            .query_row("SELECT owner_id FROM sheets WHERE id = ?", [sheet], |r| r.get(0))
            .unwrap();
        assert_eq!(owner, 7);
    }
}
