// src/sheets/batch.rs
// Request/response shapes of the differential row update, and the adapter that
// folds the older flat request shape into canonical operations.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::database::error::DbResult;
use super::row::{NewRow, Payload, RowId, RowPatch, SheetId, DEFAULT_ROW_HEIGHT};
use super::store::RowStore;

/// Body of one differential update request.
///
/// Either `operations` is filled (canonical form) or the flat legacy fields
/// are. When `operations` is present and carries at least one operation the
/// legacy fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub sheet_id: Option<SheetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Operations>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updated_rows: Vec<LegacyRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_rows: Vec<LegacyRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted_row_ids: Vec<RowId>,
    /// Deprecated: positions as seen by the client when it built the request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted_row_numbers: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operations {
    #[serde(default)]
    pub updates: Vec<UpdateOp>,
    #[serde(default)]
    pub insertions: Vec<InsertOp>,
    #[serde(default)]
    pub deletions: Vec<RowId>,
    #[serde(default)]
    pub appends: Vec<AppendOp>,
}

impl Operations {
    pub fn len(&self) -> usize {
        self.updates.len() + self.insertions.len() + self.deletions.len() + self.appends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOp {
    pub id: RowId,
    #[serde(default, alias = "data", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(default, alias = "styles", skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Payload>,
    #[serde(default, alias = "height", skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<u32>,
}

impl UpdateOp {
    pub fn patch(&self) -> RowPatch {
        RowPatch {
            payload: self.payload.clone(),
            auxiliary: self.auxiliary.clone(),
            size_hint: self.size_hint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOp {
    /// Rank among the rows left after deletions. Signed so that a bad value
    /// is reported per item instead of rejecting the request.
    #[serde(alias = "insert_at_order", default = "first_position")]
    pub insert_at_position: i64,
    #[serde(default, alias = "data")]
    pub payload: Payload,
    #[serde(default, alias = "styles", skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Payload>,
    #[serde(default, alias = "height", skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<u32>,
}

impl InsertOp {
    pub fn new_row(&self) -> NewRow {
        NewRow::new(self.payload.clone(), self.auxiliary.clone(), self.size_hint)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppendOp {
    #[serde(default, alias = "data")]
    pub payload: Payload,
    #[serde(default, alias = "styles", skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Payload>,
    #[serde(default, alias = "height", skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<u32>,
}

impl AppendOp {
    pub fn new_row(&self) -> NewRow {
        NewRow::new(self.payload.clone(), self.auxiliary.clone(), self.size_hint)
    }
}

/// Row entry of the legacy flat request shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

fn first_position() -> i64 {
    1
}

impl BatchRequest {
    /// Whether the flat legacy fields drive this request.
    pub fn is_legacy(&self) -> bool {
        self.operations.as_ref().map_or(true, Operations::is_empty)
    }

    /// Number of operations the request asks for, before normalization.
    pub fn operation_count(&self) -> usize {
        if self.is_legacy() {
            self.updated_rows.len()
                + self.new_rows.len()
                + self.deleted_row_ids.len()
                + self.deleted_row_numbers.len()
        } else {
            self.operations.as_ref().map_or(0, Operations::len)
        }
    }

    /// Translate the request into canonical operations.
    ///
    /// Legacy positional deletions are resolved to ids against the sheet's
    /// current positions, which is why a store is needed here. Positions that
    /// match no row are dropped.
    pub fn into_operations<S: RowStore>(
        self,
        store: &mut S,
        sheet_id: SheetId,
    ) -> DbResult<Operations> {
        if !self.is_legacy() {
            return Ok(self.operations.unwrap_or_default());
        }

        let mut ops = Operations::default();

        // Legacy updates overwrite all three fields.
        for row in self.updated_rows {
            let Some(id) = row.id else {
                tracing::debug!("Dropping legacy updated row without id");
                continue;
            };
            ops.updates.push(UpdateOp {
                id,
                payload: Some(row.data.unwrap_or_default()),
                auxiliary: Some(row.styles.unwrap_or_default()),
                size_hint: Some(row.height.unwrap_or(DEFAULT_ROW_HEIGHT)),
            });
        }

        for row in self.new_rows {
            ops.appends.push(AppendOp {
                payload: row.data.unwrap_or_default(),
                auxiliary: Some(row.styles.unwrap_or_default()),
                size_hint: Some(row.height.unwrap_or(DEFAULT_ROW_HEIGHT)),
            });
        }

        ops.deletions.extend(self.deleted_row_ids);

        if !self.deleted_row_numbers.is_empty() {
            tracing::warn!(
                "Sheet {}: request uses deprecated deleted_row_numbers ({} entries)",
                sheet_id,
                self.deleted_row_numbers.len()
            );
            let wanted: HashSet<u32> = self.deleted_row_numbers.into_iter().collect();
            let resolved = store
                .get_rows_ordered(sheet_id)?
                .into_iter()
                .filter(|row| wanted.contains(&row.position))
                .map(|row| row.id);
            ops.deletions.extend(resolved);
        }

        Ok(ops)
    }
}

/// Why a single operation inside a batch was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemErrorReason {
    DeleteTargetNotFound,
    UpdateTargetNotFound,
    InsertPositionOutOfRange,
}

impl fmt::Display for ItemErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemErrorReason::DeleteTargetNotFound => write!(f, "Row ID not found"),
            ItemErrorReason::UpdateTargetNotFound => write!(f, "Row not found for update"),
            ItemErrorReason::InsertPositionOutOfRange => write!(f, "Insert position out of range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    pub reason: ItemErrorReason,
}

impl ItemError {
    pub fn for_row(id: RowId, reason: ItemErrorReason) -> Self {
        Self {
            id: Some(id),
            position: None,
            reason,
        }
    }

    pub fn for_position(position: i64, reason: ItemErrorReason) -> Self {
        Self {
            id: None,
            position: Some(position),
            reason,
        }
    }
}

/// What the reconciler did with one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub updated: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub appended: usize,
    pub row_count: u32,
    pub errors: Vec<ItemError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub message: String,
    pub sheet_id: SheetId,
    pub updated_count: usize,
    pub inserted_count: usize,
    /// Appended rows, under the name older clients read.
    pub created_count: usize,
    pub appended_count: usize,
    pub deleted_count: usize,
    pub row_count: u32,
    pub errors: Vec<ItemError>,
}

impl BatchResponse {
    pub fn from_outcome(sheet_id: SheetId, outcome: BatchOutcome) -> Self {
        let success = outcome.is_success();
        let message = if success {
            "Sheet updated".to_string()
        } else {
            format!("Sheet updated with {} skipped operation(s)", outcome.errors.len())
        };
        Self {
            success,
            message,
            sheet_id,
            updated_count: outcome.updated,
            inserted_count: outcome.inserted,
            created_count: outcome.appended,
            appended_count: outcome.appended,
            deleted_count: outcome.deleted,
            row_count: outcome.row_count,
            errors: outcome.errors,
        }
    }
}
