// src/sheets/database/schema/table_creation.rs

use rusqlite::Connection;

use super::super::error::DbResult;
use super::migrations::{run_pending, Migration};

pub const SHEETS_TABLE: &str = "sheets";
pub const ROWS_TABLE: &str = "sheet_rows";

const MIGRATIONS: [Migration; 2] = [
    Migration {
        version: 1,
        description: "Created sheets and sheet_rows tables",
        apply: create_base_tables,
    },
    Migration {
        version: 2,
        description: "Added (sheet_id, updated_at) index on sheet_rows",
        apply: add_updated_at_index,
    },
];

/// Create all tables and run pending migrations
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    run_pending(conn, &MIGRATIONS)?;
    Ok(())
}

/// Migration 1: sheets and their rows.
///
/// `UNIQUE (sheet_id, position)` is checked per statement by SQLite, so every
/// position write has to target a free slot.
fn create_base_tables(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS \"{sheets}\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            owner_id INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_submitted INTEGER NOT NULL DEFAULT 0,
            submitted_at TEXT,
            row_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS \"{rows}\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sheet_id INTEGER NOT NULL REFERENCES \"{sheets}\"(id) ON DELETE CASCADE,
            position INTEGER NOT NULL CHECK (position >= 1),
            payload TEXT NOT NULL DEFAULT '{{}}',
            auxiliary TEXT NOT NULL DEFAULT '{{}}',
            size_hint INTEGER NOT NULL DEFAULT 32,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (sheet_id, position)
        );
        CREATE INDEX IF NOT EXISTS idx_{sheets}_owner ON \"{sheets}\"(owner_id);",
        sheets = SHEETS_TABLE,
        rows = ROWS_TABLE,
    ))?;
    Ok(())
}

/// Migration 2: index used when listing recently edited rows
fn add_updated_at_index(conn: &Connection) -> DbResult<()> {
    conn.execute(
        &format!(
            "CREATE INDEX IF NOT EXISTS idx_{rows}_updated ON \"{rows}\"(sheet_id, updated_at)",
            rows = ROWS_TABLE
        ),
        [],
    )?;
    Ok(())
}
