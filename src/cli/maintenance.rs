// src/cli/maintenance.rs
use std::path::Path;

use super::{open_database, CliResult};
use crate::sheets::database::validation::{
    log_validation_report, validate_all_sheets, validate_sheet_positions,
};
use crate::sheets::database::DbConnection;
use crate::sheets::SheetRowService;

pub fn init(db_path: &Path) -> CliResult {
    DbConnection::open_or_create(db_path)?;
    println!("Database ready at {}", db_path.display());
    Ok(())
}

pub fn validate(db_path: &Path, sheet: Option<i64>) -> CliResult {
    let conn = open_database(db_path)?;
    let results = match sheet {
        Some(id) => vec![validate_sheet_positions(&conn, id)?],
        None => validate_all_sheets(&conn)?,
    };

    log_validation_report(&results);
    for result in &results {
        println!("{}", result.summary());
    }

    let broken = results.iter().filter(|r| !r.is_valid()).count();
    if broken > 0 {
        return Err(format!("{} sheet(s) have position issues", broken).into());
    }
    Ok(())
}

pub fn repair(service: &SheetRowService, db_path: &Path, sheet_id: i64) -> CliResult {
    let mut conn = open_database(db_path)?;
    let rows = service.repair_positions(&mut conn, sheet_id)?;
    println!("Sheet {}: {} rows renumbered 1..{}", sheet_id, rows, rows);
    Ok(())
}
