// src/cli/apply.rs
use std::io::Read;
use std::path::Path;

use super::{open_database, CliResult};
use crate::sheets::{RequestContext, SheetRowService};

/// Read a batch request from `file` (or stdin), apply it, print the response.
/// Fatal request errors become a non-zero exit; item errors do not.
pub fn run(service: &SheetRowService, db_path: &Path, user: i64, file: Option<&Path>) -> CliResult {
    let body = read_body(file)?;
    let mut conn = open_database(db_path)?;

    let response = service.apply_batch_json(&mut conn, &RequestContext::new(user), &body)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn read_body(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}
