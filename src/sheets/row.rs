// src/sheets/row.rs
// Core row and sheet types shared by the reconciler, the stores and the service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Height used for rows that arrive without an explicit size hint.
pub const DEFAULT_ROW_HEIGHT: u32 = 32;

pub type SheetId = i64;
pub type RowId = i64;

/// Opaque key -> value mapping. The reconciler never looks inside.
pub type Payload = Map<String, Value>;

/// A persisted sheet row.
///
/// `id` is the stable identity and the only key that survives round trips.
/// `position` is the 1-indexed display rank and shifts whenever rows are
/// inserted or removed above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    pub id: RowId,
    pub sheet_id: SheetId,
    pub position: u32,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub auxiliary: Payload,
    pub size_hint: u32,
}

/// Fields of a row that does not exist yet. The store assigns the id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRow {
    pub payload: Payload,
    pub auxiliary: Payload,
    pub size_hint: u32,
}

impl NewRow {
    pub fn new(payload: Payload, auxiliary: Option<Payload>, size_hint: Option<u32>) -> Self {
        Self {
            payload,
            auxiliary: auxiliary.unwrap_or_default(),
            size_hint: size_hint.unwrap_or(DEFAULT_ROW_HEIGHT),
        }
    }
}

/// Partial update of a row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPatch {
    pub payload: Option<Payload>,
    pub auxiliary: Option<Payload>,
    pub size_hint: Option<u32>,
}

impl RowPatch {
    pub fn is_empty(&self) -> bool {
        self.payload.is_none() && self.auxiliary.is_none() && self.size_hint.is_none()
    }
}

/// A sheet (collection) header with its cached row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: SheetId,
    pub name: String,
    pub owner_id: i64,
    pub is_active: bool,
    pub is_submitted: bool,
    pub row_count: u32,
}
