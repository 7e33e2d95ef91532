// src/sheets/database/schema/migrations.rs
// Versioned schema steps, recorded in `schema_versions` once applied

use std::collections::HashSet;

use rusqlite::{params, Connection};

use super::super::error::DbResult;
use super::super::writer::helpers::now_timestamp;

/// Highest schema version this build knows how to create
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

const VERSIONS_TABLE: &str = "schema_versions";

/// One forward-only schema step
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub apply: fn(&Connection) -> DbResult<()>,
}

/// Versions already recorded, ascending
pub fn applied_versions(conn: &Connection) -> DbResult<Vec<i32>> {
    ensure_versions_table(conn)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT version FROM \"{}\" ORDER BY version",
        VERSIONS_TABLE
    ))?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<i32>, _>>()?;
    Ok(versions)
}

/// Apply every step whose version is not recorded yet, lowest first.
/// Returns how many ran.
pub fn run_pending(conn: &Connection, migrations: &[Migration]) -> DbResult<usize> {
    let applied: HashSet<i32> = applied_versions(conn)?.into_iter().collect();

    let mut pending: Vec<&Migration> = migrations
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();
    pending.sort_by_key(|m| m.version);

    for migration in &pending {
        (migration.apply)(conn)?;
        conn.execute(
            &format!(
                "INSERT INTO \"{}\" (version, description, applied_at) VALUES (?, ?, ?)",
                VERSIONS_TABLE
            ),
            params![migration.version, migration.description, now_timestamp()],
        )?;
        tracing::info!(
            "Schema migration {} applied: {}",
            migration.version,
            migration.description
        );
    }
    Ok(pending.len())
}

fn ensure_versions_table(conn: &Connection) -> DbResult<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
            VERSIONS_TABLE
        ),
        [],
    )?;
    Ok(())
}
