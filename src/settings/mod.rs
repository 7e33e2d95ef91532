pub mod io;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sheets::database::DbConfig;

/// Environment variable overriding the database file
pub const ENV_DB_PATH: &str = "SHEETROWS_DB";
/// Environment variable overriding the log filter
pub const ENV_LOG_FILTER: &str = "SHEETROWS_LOG";

/// Upper bound on operations in one batch request
pub const DEFAULT_MAX_BATCH_OPERATIONS: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Database file. `None` means `<Documents>/SheetRows/sheetrows.db`.
    pub database_path: Option<PathBuf>,
    pub max_batch_operations: usize,
    /// Re-check contiguity before committing each batch
    pub verify_positions: bool,
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            max_batch_operations: DEFAULT_MAX_BATCH_OPERATIONS,
            verify_positions: true,
            log_filter: "info".to_string(),
        }
    }
}

impl AppSettings {
    /// Apply `SHEETROWS_DB` / `SHEETROWS_LOG` on top of the file values
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(
            std::env::var(ENV_DB_PATH).ok(),
            std::env::var(ENV_LOG_FILTER).ok(),
        );
        self
    }

    fn apply_overrides(&mut self, db_path: Option<String>, log_filter: Option<String>) {
        if let Some(path) = db_path.filter(|p| !p.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(filter) = log_filter.filter(|f| !f.trim().is_empty()) {
            self.log_filter = filter;
        }
    }

    /// Database file to open, falling back to the per-user default location
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| DbConfig::new().database_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_file_uses_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"verify_positions": false}"#).unwrap();
        assert!(!settings.verify_positions);
        assert_eq!(settings.max_batch_operations, DEFAULT_MAX_BATCH_OPERATIONS);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_overrides_ignore_blank_values() {
        let mut settings = AppSettings::default();
        settings.apply_overrides(Some("/tmp/x.db".to_string()), Some("  ".to_string()));
        assert_eq!(settings.database_path, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(settings.log_filter, "info");
    }
}
