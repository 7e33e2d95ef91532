// src/sheets/reconciler.rs
// Applies one batch of row operations to a sheet and leaves positions 1..N.
//
// Step order is fixed: deletions, positional insertions, updates, appends,
// renumbering, row count. Every position write targets a vacant slot so a
// store enforcing UNIQUE(sheet, position) per statement never trips.

use std::collections::HashSet;

use super::batch::{BatchOutcome, ItemError, ItemErrorReason, Operations};
use super::database::error::DbResult;
use super::row::{RowId, SheetId, SheetRow};
use super::store::RowStore;

pub struct RowOrderReconciler<'a, S: RowStore> {
    store: &'a mut S,
    sheet_id: SheetId,
}

impl<'a, S: RowStore> RowOrderReconciler<'a, S> {
    pub fn new(store: &'a mut S, sheet_id: SheetId) -> Self {
        Self { store, sheet_id }
    }

    /// Run the whole batch. Unknown ids and out-of-range insert positions are
    /// recorded in the outcome and skipped; a storage error aborts and must be
    /// rolled back by the caller.
    pub fn apply(&mut self, ops: Operations) -> DbResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        tracing::debug!(
            "Sheet {}: applying {} deletions, {} insertions, {} updates, {} appends",
            self.sheet_id,
            ops.deletions.len(),
            ops.insertions.len(),
            ops.updates.len(),
            ops.appends.len()
        );

        self.apply_deletions(&ops, &mut outcome)?;
        self.apply_insertions(&ops, &mut outcome)?;
        self.apply_updates(&ops, &mut outcome)?;
        self.apply_appends(&ops, &mut outcome)?;

        outcome.row_count = self.renumber()?;
        self.store
            .update_collection_row_count(self.sheet_id, outcome.row_count)?;

        Ok(outcome)
    }

    fn apply_deletions(&mut self, ops: &Operations, outcome: &mut BatchOutcome) -> DbResult<()> {
        if ops.deletions.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let requested: Vec<RowId> = ops
            .deletions
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let existing: HashSet<RowId> = self
            .store
            .get_rows_by_id(self.sheet_id, &requested)?
            .into_iter()
            .map(|row| row.id)
            .collect();

        let mut to_delete = Vec::with_capacity(existing.len());
        for id in requested {
            if existing.contains(&id) {
                to_delete.push(id);
            } else {
                outcome
                    .errors
                    .push(ItemError::for_row(id, ItemErrorReason::DeleteTargetNotFound));
            }
        }

        if !to_delete.is_empty() {
            outcome.deleted = self.store.delete_rows(self.sheet_id, &to_delete)?;
        }
        Ok(())
    }

    fn apply_insertions(&mut self, ops: &Operations, outcome: &mut BatchOutcome) -> DbResult<()> {
        if ops.insertions.is_empty() {
            return Ok(());
        }

        // Stable sort keeps input order between equal positions.
        let mut sorted: Vec<_> = ops.insertions.iter().collect();
        sorted.sort_by_key(|op| op.insert_at_position);

        let mut rows = self.store.get_rows_ordered(self.sheet_id)?;
        for op in sorted {
            // P counts live rows, so after deletions it is a rank, not a stored position.
            let live = rows.len();
            let rank = match usize::try_from(op.insert_at_position) {
                Ok(rank) if (1..=live + 1).contains(&rank) => rank,
                _ => {
                    tracing::warn!(
                        "Sheet {}: insertion at {} outside 1..={}, skipped",
                        self.sheet_id,
                        op.insert_at_position,
                        live + 1
                    );
                    outcome.errors.push(ItemError::for_position(
                        op.insert_at_position,
                        ItemErrorReason::InsertPositionOutOfRange,
                    ));
                    continue;
                }
            };
            let slot = match rows.get(rank - 1) {
                Some(row) => row.position,
                None => rows.last().map_or(1, |row| row.position + 1),
            };

            // Highest position first, so each write lands on a free slot.
            for row in rows[rank - 1..].iter_mut().rev() {
                self.store.update_row_position(row.id, row.position + 1)?;
                row.position += 1;
            }

            let new_row = op.new_row();
            let id = self.store.create_row(self.sheet_id, slot, &new_row)?;
            rows.insert(
                rank - 1,
                SheetRow {
                    id,
                    sheet_id: self.sheet_id,
                    position: slot,
                    payload: new_row.payload,
                    auxiliary: new_row.auxiliary,
                    size_hint: new_row.size_hint,
                },
            );
            outcome.inserted += 1;
        }
        Ok(())
    }

    fn apply_updates(&mut self, ops: &Operations, outcome: &mut BatchOutcome) -> DbResult<()> {
        if ops.updates.is_empty() {
            return Ok(());
        }

        let ids: Vec<RowId> = ops.updates.iter().map(|u| u.id).collect();
        let existing: HashSet<RowId> = self
            .store
            .get_rows_by_id(self.sheet_id, &ids)?
            .into_iter()
            .map(|row| row.id)
            .collect();

        for update in &ops.updates {
            if !existing.contains(&update.id) {
                outcome.errors.push(ItemError::for_row(
                    update.id,
                    ItemErrorReason::UpdateTargetNotFound,
                ));
                continue;
            }
            let patch = update.patch();
            if !patch.is_empty() {
                self.store.update_row_fields(update.id, &patch)?;
            }
            outcome.updated += 1;
        }
        Ok(())
    }

    fn apply_appends(&mut self, ops: &Operations, outcome: &mut BatchOutcome) -> DbResult<()> {
        if ops.appends.is_empty() {
            return Ok(());
        }

        let max_position = self.store.max_position(self.sheet_id)?;
        for (offset, op) in ops.appends.iter().enumerate() {
            let position = max_position + offset as u32 + 1;
            self.store.create_row(self.sheet_id, position, &op.new_row())?;
            outcome.appended += 1;
        }
        Ok(())
    }

    /// Reassign positions 1..N in current order and return N.
    ///
    /// Walking upward is collision free: the k-th smallest distinct positive
    /// position is never below k, and rows already moved sit at 1..k-1.
    pub fn renumber(&mut self) -> DbResult<u32> {
        let rows = self.store.get_rows_ordered(self.sheet_id)?;
        let mut moved = 0usize;
        for (index, row) in rows.iter().enumerate() {
            let target = index as u32 + 1;
            if row.position != target {
                tracing::trace!(
                    "Sheet {}: row {} {} -> {}",
                    self.sheet_id,
                    row.id,
                    row.position,
                    target
                );
                self.store.update_row_position(row.id, target)?;
                moved += 1;
            }
        }
        if moved > 0 {
            tracing::debug!("Sheet {}: renumbered {} rows", self.sheet_id, moved);
        }
        Ok(rows.len() as u32)
    }
}
