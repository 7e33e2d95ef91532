// src/sheets/database/mod.rs

pub mod connection;
pub mod error;
pub mod reader;
pub mod schema;
pub mod sqlite_store;
pub mod validation;
pub mod writer;

pub use connection::DbConnection;
pub use error::{DbError, DbResult};
pub use reader::DbReader;
pub use sqlite_store::SqliteRowStore;
pub use writer::DbWriter;

use std::path::PathBuf;

/// File name of the database inside the data directory
pub const DB_FILE_NAME: &str = "sheetrows.db";

/// Database storage configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub data_dir: PathBuf,
}

impl DbConfig {
    pub fn default_path() -> PathBuf {
        let documents = directories_next::UserDirs::new()
            .and_then(|dirs| dirs.document_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        documents.join("SheetRows")
    }

    pub fn new() -> Self {
        Self {
            data_dir: Self::default_path(),
        }
    }

    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new()
    }
}
