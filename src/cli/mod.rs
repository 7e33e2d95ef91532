// src/cli/mod.rs
// Command line front end: batch apply, sheet management and maintenance tools

pub mod apply;
pub mod config;
pub mod maintenance;
pub mod sheets;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::settings::AppSettings;
use crate::sheets::database::{DbConnection, DbResult};
use crate::sheets::SheetRowService;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "sheetrows")]
#[command(about = "SheetRows - ordered sheet rows with differential batch updates", long_about = None)]
pub struct Cli {
    /// Database file (overrides settings and SHEETROWS_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database file and schema
    Init,

    /// Create an empty sheet and print its id
    CreateSheet {
        #[arg(long)]
        owner: i64,
        #[arg(long)]
        name: String,
    },

    /// Apply a batch request (JSON) and print the response
    Apply {
        /// Calling user id
        #[arg(long)]
        user: i64,
        /// Request file; reads stdin when omitted or "-"
        file: Option<PathBuf>,
    },

    /// Print a sheet's rows in display order as JSON
    ListRows {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        sheet: i64,
    },

    /// Submit a sheet, locking it against further edits by its owner
    Submit {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        sheet: i64,
    },

    /// Check that positions are contiguous and row counts are in sync
    Validate {
        /// Only this sheet; all sheets when omitted
        #[arg(long)]
        sheet: Option<i64>,
    },

    /// Renumber a sheet's positions to 1..N and refresh its row count
    Repair {
        #[arg(long)]
        sheet: i64,
    },

    /// Show the effective settings and where they are stored
    Config {
        /// Save the effective settings to the settings file
        #[arg(long)]
        write: bool,
    },
}

/// Dispatch a parsed command line
pub fn run(cli: Cli, settings: &AppSettings) -> CliResult {
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| settings.resolved_database_path());
    let service = SheetRowService::from_settings(settings);

    match cli.command {
        Commands::Init => maintenance::init(&db_path),
        Commands::CreateSheet { owner, name } => {
            sheets::create_sheet(&service, &db_path, owner, &name)
        }
        Commands::Apply { user, file } => apply::run(&service, &db_path, user, file.as_deref()),
        Commands::ListRows { user, sheet } => sheets::list_rows(&service, &db_path, user, sheet),
        Commands::Submit { user, sheet } => sheets::submit(&service, &db_path, user, sheet),
        Commands::Validate { sheet } => maintenance::validate(&db_path, sheet),
        Commands::Repair { sheet } => maintenance::repair(&service, &db_path, sheet),
        Commands::Config { write } => config::show(settings, write),
    }
}

/// Open an existing database; commands other than `init` never create one
pub(crate) fn open_database(path: &std::path::Path) -> DbResult<rusqlite::Connection> {
    if !path.exists() {
        return Err(crate::sheets::database::DbError::Other(format!(
            "Database {} does not exist, run `sheetrows init` first",
            path.display()
        )));
    }
    DbConnection::open_existing(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply_with_global_db() {
        let cli = Cli::try_parse_from(["sheetrows", "apply", "--user", "3", "--db", "x.db", "req.json"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Commands::Apply { user, file } => {
                assert_eq!(user, 3);
                assert_eq!(file, Some(PathBuf::from("req.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_validate_sheet_is_optional() {
        let cli = Cli::try_parse_from(["sheetrows", "validate"]).unwrap();
        assert!(matches!(cli.command, Commands::Validate { sheet: None }));
    }

    #[test]
    fn test_config_write_flag() {
        let cli = Cli::try_parse_from(["sheetrows", "config", "--write"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { write: true }));
    }
}
