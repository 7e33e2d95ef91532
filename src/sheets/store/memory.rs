// src/sheets/store/memory.rs
// Instrumented in-memory RowStore for reconciler tests

#![cfg(test)]

use std::collections::{BTreeMap, HashMap};

use super::RowStore;
use crate::sheets::database::error::{DbError, DbResult};
use crate::sheets::row::{NewRow, RowId, RowPatch, SheetId, SheetRow};

/// One mutation observed by [`MemoryRowStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    Create { sheet_id: SheetId, id: RowId, position: u32 },
    Move { id: RowId, from: u32, to: u32 },
    Delete { id: RowId },
    Fields { id: RowId },
    RowCount { sheet_id: SheetId, count: u32 },
}

/// In-memory row store that enforces `(sheet, position)` uniqueness on every
/// single write and keeps a log of all writes.
///
/// Ids come from a monotonically increasing counter and are never reused.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    rows: HashMap<RowId, SheetRow>,
    /// (sheet, position) -> row id, mirrors the UNIQUE index of the SQL schema
    slots: BTreeMap<(SheetId, u32), RowId>,
    row_counts: HashMap<SheetId, u32>,
    next_id: RowId,
    writes: Vec<StoreWrite>,
    fail_after_writes: Option<usize>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Build a store holding `count` rows at positions `1..=count`, each with
    /// a payload of `{"n": <position>}`. Returns the store and the row ids in
    /// position order. The write log starts empty.
    pub fn seeded(sheet_id: SheetId, count: u32) -> (Self, Vec<RowId>) {
        let mut store = Self::new();
        let mut ids = Vec::with_capacity(count as usize);
        for position in 1..=count {
            let mut payload = serde_json::Map::new();
            payload.insert("n".to_string(), serde_json::Value::from(position));
            let row = NewRow::new(payload, None, None);
            let id = store.insert_unchecked(sheet_id, position, &row);
            ids.push(id);
        }
        store.row_counts.insert(sheet_id, count);
        (store, ids)
    }

    /// Make every write after the first `n` fail, to exercise rollback paths.
    pub fn fail_after_writes(&mut self, n: usize) {
        self.fail_after_writes = Some(n);
    }

    pub fn writes(&self) -> &[StoreWrite] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn row(&self, id: RowId) -> Option<&SheetRow> {
        self.rows.get(&id)
    }

    pub fn row_count(&self, sheet_id: SheetId) -> Option<u32> {
        self.row_counts.get(&sheet_id).copied()
    }

    /// Row ids of the sheet in position order.
    pub fn ids_in_order(&self, sheet_id: SheetId) -> Vec<RowId> {
        self.slots
            .range((sheet_id, 0)..=(sheet_id, u32::MAX))
            .map(|(_, id)| *id)
            .collect()
    }

    fn insert_unchecked(&mut self, sheet_id: SheetId, position: u32, row: &NewRow) -> RowId {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(
            id,
            SheetRow {
                id,
                sheet_id,
                position,
                payload: row.payload.clone(),
                auxiliary: row.auxiliary.clone(),
                size_hint: row.size_hint,
            },
        );
        self.slots.insert((sheet_id, position), id);
        id
    }

    fn record(&mut self, write: StoreWrite) -> DbResult<()> {
        if let Some(limit) = self.fail_after_writes {
            if self.writes.len() >= limit {
                return Err(DbError::Other(format!(
                    "simulated storage failure after {} writes",
                    limit
                )));
            }
        }
        self.writes.push(write);
        Ok(())
    }
}

impl RowStore for MemoryRowStore {
    fn get_rows_ordered(&mut self, sheet_id: SheetId) -> DbResult<Vec<SheetRow>> {
        Ok(self
            .ids_in_order(sheet_id)
            .into_iter()
            .filter_map(|id| self.rows.get(&id).cloned())
            .collect())
    }

    fn get_rows_by_id(&mut self, sheet_id: SheetId, ids: &[RowId]) -> DbResult<Vec<SheetRow>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.rows.get(id))
            .filter(|row| row.sheet_id == sheet_id)
            .cloned()
            .collect())
    }

    fn create_row(&mut self, sheet_id: SheetId, position: u32, row: &NewRow) -> DbResult<RowId> {
        if self.slots.contains_key(&(sheet_id, position)) {
            return Err(DbError::PositionConflict { sheet_id, position });
        }
        self.record(StoreWrite::Create {
            sheet_id,
            id: self.next_id,
            position,
        })?;
        Ok(self.insert_unchecked(sheet_id, position, row))
    }

    fn update_row_position(&mut self, id: RowId, new_position: u32) -> DbResult<()> {
        let (sheet_id, from) = match self.rows.get(&id) {
            Some(row) => (row.sheet_id, row.position),
            None => return Err(DbError::RowNotFound(id)),
        };
        if from == new_position {
            return Ok(());
        }
        if self.slots.contains_key(&(sheet_id, new_position)) {
            return Err(DbError::PositionConflict {
                sheet_id,
                position: new_position,
            });
        }
        self.record(StoreWrite::Move {
            id,
            from,
            to: new_position,
        })?;
        self.slots.remove(&(sheet_id, from));
        self.slots.insert((sheet_id, new_position), id);
        if let Some(row) = self.rows.get_mut(&id) {
            row.position = new_position;
        }
        Ok(())
    }

    fn delete_rows(&mut self, sheet_id: SheetId, ids: &[RowId]) -> DbResult<usize> {
        let mut deleted = 0;
        for id in ids {
            let position = match self.rows.get(id) {
                Some(row) if row.sheet_id == sheet_id => row.position,
                _ => continue,
            };
            self.record(StoreWrite::Delete { id: *id })?;
            self.rows.remove(id);
            self.slots.remove(&(sheet_id, position));
            deleted += 1;
        }
        Ok(deleted)
    }

    fn update_row_fields(&mut self, id: RowId, patch: &RowPatch) -> DbResult<()> {
        if !self.rows.contains_key(&id) {
            return Err(DbError::RowNotFound(id));
        }
        self.record(StoreWrite::Fields { id })?;
        if let Some(row) = self.rows.get_mut(&id) {
            apply_patch(patch, row);
        }
        Ok(())
    }

    fn update_collection_row_count(&mut self, sheet_id: SheetId, count: u32) -> DbResult<()> {
        self.record(StoreWrite::RowCount { sheet_id, count })?;
        self.row_counts.insert(sheet_id, count);
        Ok(())
    }
}

/// Copy the present fields of `patch` onto `row`. Never touches id or position.
fn apply_patch(patch: &RowPatch, row: &mut SheetRow) {
    if let Some(payload) = &patch.payload {
        row.payload = payload.clone();
    }
    if let Some(auxiliary) = &patch.auxiliary {
        row.auxiliary = auxiliary.clone();
    }
    if let Some(size_hint) = patch.size_hint {
        row.size_hint = size_hint;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_store_is_contiguous() {
        let (mut store, ids) = MemoryRowStore::seeded(1, 4);
        let rows = store.get_rows_ordered(1).unwrap();
        let positions: Vec<u32> = rows.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(store.ids_in_order(1), ids);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_move_into_occupied_slot_is_rejected() {
        let (mut store, ids) = MemoryRowStore::seeded(1, 3);
        let err = store.update_row_position(ids[0], 2).unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(store.row(ids[0]).unwrap().position, 1);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (mut store, ids) = MemoryRowStore::seeded(1, 2);
        store.delete_rows(1, &[ids[1]]).unwrap();
        let new_id = store.create_row(1, 2, &NewRow::default()).unwrap();
        assert!(new_id > ids[1]);
    }

    #[test]
    fn test_rows_of_other_sheets_are_invisible() {
        let (mut store, ids) = MemoryRowStore::seeded(1, 2);
        assert!(store.get_rows_by_id(2, &ids).unwrap().is_empty());
        assert_eq!(store.delete_rows(2, &ids).unwrap(), 0);
    }

    #[test]
    fn test_patch_leaves_absent_fields_and_position() {
        let (mut store, ids) = MemoryRowStore::seeded(1, 3);
        let patch = RowPatch {
            size_hint: Some(48),
            ..Default::default()
        };
        store.update_row_fields(ids[2], &patch).unwrap();

        let row = store.row(ids[2]).unwrap();
        assert_eq!(row.size_hint, 48);
        assert_eq!(row.payload["n"], serde_json::json!(3));
        assert_eq!(row.position, 3);
    }

    #[test]
    fn test_failure_injection() {
        let (mut store, ids) = MemoryRowStore::seeded(1, 2);
        store.fail_after_writes(1);
        store.update_row_position(ids[1], 3).unwrap();
        assert!(store.update_row_position(ids[0], 2).is_err());
    }
}
