// src/sheets/database/error.rs

use std::fmt;

use crate::sheets::row::{RowId, SheetId};

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    SerdeJson(serde_json::Error),
    /// A write would give two rows of the same sheet the same position.
    PositionConflict { sheet_id: SheetId, position: u32 },
    RowNotFound(RowId),
    SheetNotFound(SheetId),
    Other(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Sqlite(e) => write!(f, "SQLite error: {}", e),
            DbError::Io(e) => write!(f, "I/O error: {}", e),
            DbError::SerdeJson(e) => write!(f, "JSON error: {}", e),
            DbError::PositionConflict { sheet_id, position } => write!(
                f,
                "Position conflict: sheet {} already has a row at position {}",
                sheet_id, position
            ),
            DbError::RowNotFound(id) => write!(f, "Row not found: {}", id),
            DbError::SheetNotFound(id) => write!(f, "Sheet not found: {}", id),
            DbError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Sqlite(e) => Some(e),
            DbError::Io(e) => Some(e),
            DbError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        DbError::Sqlite(e)
    }
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        DbError::Io(e)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::SerdeJson(e)
    }
}

impl DbError {
    /// True when SQLite rejected a write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::PositionConflict { .. } => true,
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            _ => false,
        }
    }
}
