// src/sheets/mod.rs

// --- Public Interface ---
pub mod batch;
pub mod database;
pub mod reconciler;
pub mod row;
pub mod service;
pub mod store;

pub use batch::{BatchOutcome, BatchRequest, BatchResponse, ItemError, ItemErrorReason, Operations};
pub use reconciler::RowOrderReconciler;
pub use row::{NewRow, RowId, RowPatch, Sheet, SheetId, SheetRow, DEFAULT_ROW_HEIGHT};
pub use service::{BatchError, RequestContext, SheetRowService};
pub use store::RowStore;
