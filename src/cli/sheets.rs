// src/cli/sheets.rs
use std::path::Path;

use super::{open_database, CliResult};
use crate::sheets::{RequestContext, SheetRowService};

pub fn create_sheet(service: &SheetRowService, db_path: &Path, owner: i64, name: &str) -> CliResult {
    let conn = open_database(db_path)?;
    let sheet = service.create_sheet(&conn, &RequestContext::new(owner), name)?;
    println!("{}", sheet.id);
    Ok(())
}

pub fn list_rows(service: &SheetRowService, db_path: &Path, user: i64, sheet_id: i64) -> CliResult {
    let conn = open_database(db_path)?;
    let rows = service.list_rows(&conn, &RequestContext::new(user), sheet_id)?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

pub fn submit(service: &SheetRowService, db_path: &Path, user: i64, sheet_id: i64) -> CliResult {
    let mut conn = open_database(db_path)?;
    service.submit_sheet(&mut conn, &RequestContext::new(user), sheet_id)?;
    println!("Sheet {} submitted", sheet_id);
    Ok(())
}
