// src/sheets/database/validation.rs
// Validation utilities for position integrity checks

use rusqlite::Connection;

use super::error::DbResult;
use super::reader::DbReader;
use super::schema::{ROWS_TABLE, SHEETS_TABLE};
use crate::sheets::row::{RowId, SheetId};

#[derive(Debug, Clone)]
pub struct PositionValidationResult {
    pub sheet_id: SheetId,
    pub total_rows: i64,
    pub distinct_positions: i64,
    pub min_position: Option<i64>,
    pub max_position: Option<i64>,
    pub duplicates: Vec<DuplicateInfo>,
    /// Positions in 1..=total_rows that no row holds
    pub missing_positions: i64,
    pub cached_row_count: i64,
    pub has_issues: bool,
}

#[derive(Debug, Clone)]
pub struct DuplicateInfo {
    pub position: i64,
    pub count: i64,
    pub row_ids: Vec<RowId>,
}

impl PositionValidationResult {
    pub fn is_valid(&self) -> bool {
        !self.has_issues
    }

    pub fn summary(&self) -> String {
        if self.is_valid() {
            format!(
                "✓ sheet {}: {} rows, contiguous positions {}-{}",
                self.sheet_id,
                self.total_rows,
                self.min_position.unwrap_or(0),
                self.max_position.unwrap_or(0)
            )
        } else {
            let mut issues = Vec::new();
            if !self.duplicates.is_empty() {
                issues.push(format!("{} duplicate positions", self.duplicates.len()));
            }
            if self.missing_positions > 0 {
                issues.push(format!("{} gaps", self.missing_positions));
            }
            if self.min_position.is_some_and(|min| min != 1) {
                issues.push(format!("starts at {}", self.min_position.unwrap_or(0)));
            }
            if self.cached_row_count != self.total_rows {
                issues.push(format!(
                    "row_count {} but {} rows stored",
                    self.cached_row_count, self.total_rows
                ));
            }
            format!(
                "⚠ sheet {}: {} rows, {} distinct positions, issues: {}",
                self.sheet_id,
                self.total_rows,
                self.distinct_positions,
                issues.join(", ")
            )
        }
    }
}

/// Check that a sheet's positions are exactly 1..N and its cached count is N
pub fn validate_sheet_positions(
    conn: &Connection,
    sheet_id: SheetId,
) -> DbResult<PositionValidationResult> {
    let (total_rows, distinct_positions, min_position, max_position): (i64, i64, Option<i64>, Option<i64>) =
        conn.query_row(
            &format!(
                "SELECT
                    COUNT(*) as total,
                    COUNT(DISTINCT position) as distinct_count,
                    MIN(position) as min_pos,
                    MAX(position) as max_pos
                FROM \"{}\" WHERE sheet_id = ?",
                ROWS_TABLE
            ),
            [sheet_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

    let cached_row_count: i64 = conn.query_row(
        &format!("SELECT row_count FROM \"{}\" WHERE id = ?", SHEETS_TABLE),
        [sheet_id],
        |row| row.get(0),
    )?;

    let mut duplicates = Vec::new();
    if distinct_positions < total_rows {
        let mut stmt = conn.prepare(&format!(
            "SELECT position, COUNT(*) as cnt, GROUP_CONCAT(id) as ids
             FROM \"{}\"
             WHERE sheet_id = ?
             GROUP BY position
             HAVING cnt > 1
             ORDER BY position",
            ROWS_TABLE
        ))?;
        let rows = stmt.query_map([sheet_id], |row| {
            let ids_str: String = row.get(2)?;
            let mut row_ids: Vec<RowId> = ids_str
                .split(',')
                .filter_map(|s| s.parse::<RowId>().ok())
                .collect();
            row_ids.sort_unstable();
            Ok(DuplicateInfo {
                position: row.get(0)?,
                count: row.get(1)?,
                row_ids,
            })
        })?;
        for dup in rows {
            duplicates.push(dup?);
        }
    }

    let in_range: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(DISTINCT position) FROM \"{}\" WHERE sheet_id = ? AND position BETWEEN 1 AND ?",
            ROWS_TABLE
        ),
        [sheet_id, total_rows],
        |row| row.get(0),
    )?;
    let missing_positions = total_rows - in_range;

    let has_issues = !duplicates.is_empty()
        || missing_positions > 0
        || cached_row_count != total_rows
        || (total_rows > 0 && (min_position != Some(1) || max_position != Some(total_rows)));

    Ok(PositionValidationResult {
        sheet_id,
        total_rows,
        distinct_positions,
        min_position,
        max_position,
        duplicates,
        missing_positions,
        cached_row_count,
        has_issues,
    })
}

/// Validate every sheet in the database
pub fn validate_all_sheets(conn: &Connection) -> DbResult<Vec<PositionValidationResult>> {
    let mut results = Vec::new();
    for sheet in DbReader::list_sheets(conn)? {
        results.push(validate_sheet_positions(conn, sheet.id)?);
    }
    Ok(results)
}

/// Log a validation report for all sheets
pub fn log_validation_report(results: &[PositionValidationResult]) {
    let mut valid_sheets = 0;
    let mut sheets_with_issues = 0;

    for result in results {
        if result.is_valid() {
            valid_sheets += 1;
            tracing::debug!("{}", result.summary());
        } else {
            sheets_with_issues += 1;
            tracing::warn!("{}", result.summary());

            for dup in result.duplicates.iter().take(5) {
                tracing::warn!(
                    "  Duplicate: position={} appears {} times (row IDs: {:?})",
                    dup.position,
                    dup.count,
                    &dup.row_ids[..dup.row_ids.len().min(10)]
                );
            }
            if result.duplicates.len() > 5 {
                tracing::warn!("  ... and {} more duplicates", result.duplicates.len() - 5);
            }
        }
    }

    tracing::info!(
        "Position check: {} sheets, {} valid, {} with issues",
        results.len(),
        valid_sheets,
        sheets_with_issues
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::database::writer::test_helpers::{seed_sheet, setup_db};

    #[test]
    fn test_seeded_sheet_is_valid() {
        let conn = setup_db();
        let (sheet, _) = seed_sheet(&conn, 1, 5);

        let result = validate_sheet_positions(&conn, sheet).unwrap();
        assert!(result.is_valid(), "{}", result.summary());
        assert_eq!(result.total_rows, 5);
        assert_eq!(result.min_position, Some(1));
        assert_eq!(result.max_position, Some(5));
    }

    #[test]
    fn test_empty_sheet_is_valid() {
        let conn = setup_db();
        let (sheet, _) = seed_sheet(&conn, 1, 0);
        assert!(validate_sheet_positions(&conn, sheet).unwrap().is_valid());
    }

    #[test]
    fn test_gap_and_stale_count_are_reported() {
        let conn = setup_db();
        let (sheet, ids) = seed_sheet(&conn, 1, 4);
        conn.execute("DELETE FROM sheet_rows WHERE id = ?", [ids[1]]).unwrap();

        let result = validate_sheet_positions(&conn, sheet).unwrap();
        assert!(result.has_issues);
        assert_eq!(result.missing_positions, 1);
        assert_eq!(result.cached_row_count, 4);
        assert_eq!(result.total_rows, 3);
    }

    #[test]
    fn test_duplicates_without_unique_index() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sheets (id INTEGER PRIMARY KEY, row_count INTEGER);
             CREATE TABLE sheet_rows (id INTEGER PRIMARY KEY, sheet_id INTEGER, position INTEGER);
             INSERT INTO sheets VALUES (1, 3);
             INSERT INTO sheet_rows VALUES (1, 1, 1), (2, 1, 2), (3, 1, 2);",
        )
        .unwrap();

        let result = validate_sheet_positions(&conn, 1).unwrap();
        assert!(result.has_issues);
        assert_eq!(result.duplicates.len(), 1);
        assert_eq!(result.duplicates[0].position, 2);
        assert_eq!(result.duplicates[0].row_ids, vec![2, 3]);
        assert_eq!(result.missing_positions, 1);
    }
}
