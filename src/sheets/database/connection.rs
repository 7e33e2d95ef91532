// src/sheets/database/connection.rs

use super::error::DbResult;
use rusqlite::Connection;
use std::path::Path;

pub struct DbConnection;

impl DbConnection {
    /// Creates a new database with WAL mode enabled and the schema in place
    pub fn create_new(path: &Path) -> DbResult<Connection> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;

        let journal_mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            tracing::error!(
                "Failed to set WAL mode on new database {:?}. Current mode: {}",
                path.file_name(),
                journal_mode
            );
        } else {
            tracing::info!("WAL mode activated for new database {:?}", path.file_name());
        }

        Self::apply_pragmas(&conn)?;
        super::schema::ensure_schema(&conn)?;

        Ok(conn)
    }

    /// Opens an existing database and ensures WAL mode is enabled.
    /// PRAGMA settings are per connection, so this runs on every open.
    pub fn open_existing(path: &Path) -> DbResult<Connection> {
        let conn = Connection::open(path)?;

        let journal_mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            tracing::warn!(
                "Failed to set WAL mode on database {:?}. Current mode: {}. This may indicate the database is in use by another connection.",
                path.file_name(),
                journal_mode
            );
        } else {
            tracing::debug!("WAL mode activated for database {:?}", path.file_name());
        }

        Self::apply_pragmas(&conn)?;
        super::schema::ensure_schema(&conn)?;

        Ok(conn)
    }

    /// Opens the database at `path`, creating it when missing
    pub fn open_or_create(path: &Path) -> DbResult<Connection> {
        if path.exists() {
            Self::open_existing(path)
        } else {
            Self::create_new(path)
        }
    }

    /// Private in-memory database with the full schema, used by tests and dry runs
    pub fn open_in_memory() -> DbResult<Connection> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        super::schema::ensure_schema(&conn)?;
        Ok(conn)
    }

    fn apply_pragmas(conn: &Connection) -> DbResult<()> {
        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;
             PRAGMA temp_store=MEMORY;
             PRAGMA busy_timeout=5000;",
        )?;
        Ok(())
    }
}
