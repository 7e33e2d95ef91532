// src/sheets/service.rs
// Entry point for sheet row edits: request checks, transaction scope, reconcile

use rusqlite::{Connection, TransactionBehavior};
use thiserror::Error;

use super::batch::{BatchRequest, BatchResponse};
use super::database::error::DbError;
use super::database::validation::validate_sheet_positions;
use super::database::{DbReader, DbWriter, SqliteRowStore};
use super::reconciler::RowOrderReconciler;
use super::row::{Sheet, SheetId, SheetRow};
use crate::settings::AppSettings;

/// Who is calling. Passed explicitly into every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: i64,
}

impl RequestContext {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Request-level failures. Nothing is persisted when one of these is returned.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("sheet_id is required")]
    MissingSheetId,
    #[error("Sheet {0} not found")]
    SheetNotFound(SheetId),
    #[error("Sheet {0} has been submitted and can no longer be edited")]
    SheetLocked(SheetId),
    #[error("Batch has {count} operations, the limit is {limit}")]
    BatchTooLarge { count: usize, limit: usize },
    #[error("Malformed request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    #[error("Sheet {sheet_id} failed position check after apply: {summary}")]
    InvariantViolation { sheet_id: SheetId, summary: String },
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

impl From<rusqlite::Error> for BatchError {
    fn from(e: rusqlite::Error) -> Self {
        BatchError::Storage(DbError::Sqlite(e))
    }
}

#[derive(Debug, Clone)]
pub struct SheetRowService {
    max_batch_operations: usize,
    verify_positions: bool,
}

impl Default for SheetRowService {
    fn default() -> Self {
        Self::from_settings(&AppSettings::default())
    }
}

impl SheetRowService {
    pub fn new(max_batch_operations: usize, verify_positions: bool) -> Self {
        Self {
            max_batch_operations,
            verify_positions,
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.max_batch_operations, settings.verify_positions)
    }

    /// Parse a JSON body and apply it.
    pub fn apply_batch_json(
        &self,
        conn: &mut Connection,
        ctx: &RequestContext,
        body: &str,
    ) -> Result<BatchResponse, BatchError> {
        let request: BatchRequest = serde_json::from_str(body)?;
        self.apply_batch(conn, ctx, request)
    }

    /// Apply one differential update batch to a sheet owned by the caller.
    ///
    /// The whole batch runs in one `BEGIN IMMEDIATE` transaction, which also
    /// serializes concurrent batches on the same database. Item-level problems
    /// end up in the response; anything returned as `Err` has been rolled back.
    pub fn apply_batch(
        &self,
        conn: &mut Connection,
        ctx: &RequestContext,
        request: BatchRequest,
    ) -> Result<BatchResponse, BatchError> {
        let sheet_id = request.sheet_id.ok_or(BatchError::MissingSheetId)?;

        let count = request.operation_count();
        if count > self.max_batch_operations {
            return Err(BatchError::BatchTooLarge {
                count,
                limit: self.max_batch_operations,
            });
        }

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let sheet = load_editable_sheet(&tx, ctx, sheet_id)?;

        let outcome = {
            let mut store = SqliteRowStore::new(&tx);
            let ops = request.into_operations(&mut store, sheet.id)?;
            RowOrderReconciler::new(&mut store, sheet.id).apply(ops)?
        };

        if self.verify_positions {
            let check = validate_sheet_positions(&tx, sheet.id)?;
            if !check.is_valid() {
                tracing::error!("{}", check.summary());
                return Err(BatchError::InvariantViolation {
                    sheet_id: sheet.id,
                    summary: check.summary(),
                });
            }
        }

        tx.commit()?;

        if outcome.is_success() {
            tracing::info!(
                "Sheet {}: updated={} inserted={} deleted={} appended={} rows={}",
                sheet.id,
                outcome.updated,
                outcome.inserted,
                outcome.deleted,
                outcome.appended,
                outcome.row_count
            );
        } else {
            tracing::warn!(
                "Sheet {}: applied with {} item errors (updated={} inserted={} deleted={} appended={})",
                sheet.id,
                outcome.errors.len(),
                outcome.updated,
                outcome.inserted,
                outcome.deleted,
                outcome.appended
            );
        }

        Ok(BatchResponse::from_outcome(sheet.id, outcome))
    }

    /// Create an empty sheet for the caller
    pub fn create_sheet(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Sheet, BatchError> {
        let id = DbWriter::create_sheet(conn, name, ctx.user_id)?;
        tracing::info!("Created sheet {} '{}' for user {}", id, name, ctx.user_id);
        DbReader::get_sheet(conn, id)?.ok_or(BatchError::SheetNotFound(id))
    }

    /// Rows of one of the caller's sheets in display order
    pub fn list_rows(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        sheet_id: SheetId,
    ) -> Result<Vec<SheetRow>, BatchError> {
        let sheet = load_owned_sheet(conn, ctx, sheet_id)?;
        Ok(DbReader::get_rows_ordered(conn, sheet.id)?)
    }

    /// Lock a sheet: after this the owner can no longer apply batches to it
    pub fn submit_sheet(
        &self,
        conn: &mut Connection,
        ctx: &RequestContext,
        sheet_id: SheetId,
    ) -> Result<(), BatchError> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let sheet = load_editable_sheet(&tx, ctx, sheet_id)?;
        DbWriter::set_sheet_submitted(&tx, sheet.id, true)?;
        tx.commit()?;
        tracing::info!("Sheet {} submitted by user {}", sheet.id, ctx.user_id);
        Ok(())
    }

    /// Close gaps in a sheet's positions and refresh its cached row count.
    /// Maintenance path for databases touched by other writers; no owner check.
    pub fn repair_positions(&self, conn: &mut Connection, sheet_id: SheetId) -> Result<u32, BatchError> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if DbReader::get_sheet(&tx, sheet_id)?.is_none() {
            return Err(BatchError::SheetNotFound(sheet_id));
        }

        let row_count = {
            let mut store = SqliteRowStore::new(&tx);
            let mut reconciler = RowOrderReconciler::new(&mut store, sheet_id);
            reconciler.renumber()?
        };
        DbWriter::update_sheet_row_count(&tx, sheet_id, row_count)?;
        tx.commit()?;

        tracing::info!("Sheet {}: positions repaired, {} rows", sheet_id, row_count);
        Ok(row_count)
    }
}

/// Sheet owned by the caller and still active. Other owners' sheets are
/// reported as missing rather than forbidden.
fn load_owned_sheet(conn: &Connection, ctx: &RequestContext, sheet_id: SheetId) -> Result<Sheet, BatchError> {
    match DbReader::get_sheet(conn, sheet_id)? {
        Some(sheet) if sheet.owner_id == ctx.user_id && sheet.is_active => Ok(sheet),
        _ => Err(BatchError::SheetNotFound(sheet_id)),
    }
}

fn load_editable_sheet(conn: &Connection, ctx: &RequestContext, sheet_id: SheetId) -> Result<Sheet, BatchError> {
    let sheet = load_owned_sheet(conn, ctx, sheet_id)?;
    if sheet.is_submitted {
        return Err(BatchError::SheetLocked(sheet_id));
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::database::writer::test_helpers::{positions_of, seed_sheet, setup_db};
    use serde_json::json;

    fn service() -> SheetRowService {
        SheetRowService::new(100, true)
    }

    #[test]
    fn test_missing_sheet_id_is_fatal() {
        let mut conn = setup_db();
        let err = service()
            .apply_batch_json(&mut conn, &RequestContext::new(1), r#"{"operations": {}}"#)
            .unwrap_err();
        assert!(matches!(err, BatchError::MissingSheetId));
    }

    #[test]
    fn test_foreign_sheet_is_not_found_and_untouched() {
        let mut conn = setup_db();
        let (sheet, ids) = seed_sheet(&conn, 1, 3);
        let body = json!({"sheet_id": sheet, "operations": {"deletions": [ids[0]]}}).to_string();

        let err = service()
            .apply_batch_json(&mut conn, &RequestContext::new(2), &body)
            .unwrap_err();

        assert!(matches!(err, BatchError::SheetNotFound(id) if id == sheet));
        assert_eq!(positions_of(&conn, sheet), vec![1, 2, 3]);
    }

    #[test]
    fn test_submitted_sheet_is_locked() {
        let mut conn = setup_db();
        let (sheet, _) = seed_sheet(&conn, 1, 1);
        let ctx = RequestContext::new(1);
        service().submit_sheet(&mut conn, &ctx, sheet).unwrap();

        let body = json!({"sheet_id": sheet, "new_rows": [{"data": {}}]}).to_string();
        let err = service().apply_batch_json(&mut conn, &ctx, &body).unwrap_err();
        assert!(matches!(err, BatchError::SheetLocked(_)));
    }

    #[test]
    fn test_batch_limit() {
        let mut conn = setup_db();
        let (sheet, _) = seed_sheet(&conn, 1, 0);
        let body = json!({
            "sheet_id": sheet,
            "operations": {"appends": [{}, {}, {}]}
        })
        .to_string();

        let err = SheetRowService::new(2, true)
            .apply_batch_json(&mut conn, &RequestContext::new(1), &body)
            .unwrap_err();
        assert!(matches!(err, BatchError::BatchTooLarge { count: 3, limit: 2 }));
    }

    #[test]
    fn test_malformed_body() {
        let mut conn = setup_db();
        let err = service()
            .apply_batch_json(&mut conn, &RequestContext::new(1), "{not json")
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidRequest(_)));
    }

    #[test]
    fn test_repair_closes_gaps() {
        let mut conn = setup_db();
        let (sheet, ids) = seed_sheet(&conn, 1, 4);
        conn.execute("DELETE FROM sheet_rows WHERE id = ?", [ids[0]]).unwrap();

        let count = service().repair_positions(&mut conn, sheet).unwrap();

        assert_eq!(count, 3);
        assert_eq!(positions_of(&conn, sheet), vec![1, 2, 3]);
        assert!(validate_sheet_positions(&conn, sheet).unwrap().is_valid());
    }

    #[test]
    fn test_create_and_list() {
        let conn = setup_db();
        let ctx = RequestContext::new(9);
        let sheet = service().create_sheet(&conn, &ctx, "Weekly").unwrap();
        assert_eq!(sheet.owner_id, 9);
        assert_eq!(sheet.row_count, 0);
        assert!(service().list_rows(&conn, &ctx, sheet.id).unwrap().is_empty());
        assert!(service()
            .list_rows(&conn, &RequestContext::new(1), sheet.id)
            .is_err());
    }
}
