//! In-process batch persistence, keyed for concurrent access.

use std::collections::HashMap;

use dashmap::DashMap;
use rust_decimal::Decimal;

use chrono::Utc;

use saldo_shared::types::{BatchId, EntityId, MonthRange, Period};

use crate::validate::Alert;

use super::error::BatchError;
use super::types::{BatchStatus, LedgerLine, LineKey, UploadBatch};

/// Store for batches, their lines and their alerts.
///
/// One invariant is enforced at registration: at most one non-cancelled
/// batch per (entity, period). The `index` map is the authority for that
/// slot; cancelled batches release it.
#[derive(Debug, Default)]
pub struct BatchStore {
    batches: DashMap<BatchId, UploadBatch>,
    lines: DashMap<BatchId, Vec<LedgerLine>>,
    alerts: DashMap<BatchId, Vec<Alert>>,
    index: DashMap<(EntityId, Period), BatchId>,
}

impl BatchStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new `Processing` batch for the slot.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateUpload` when a non-cancelled batch with the same
    /// file hash already occupies the slot, and `PeriodOccupied` when a
    /// different file does. A cancelled occupant is evicted silently.
    pub fn register(
        &self,
        entity_id: EntityId,
        period: Period,
        file_hash: String,
    ) -> Result<UploadBatch, BatchError> {
        use dashmap::mapref::entry::Entry;

        let now = Utc::now();
        let batch = UploadBatch {
            id: BatchId::new(),
            entity_id,
            period,
            file_hash,
            status: BatchStatus::Processing,
            total_lines: 0,
            created_at: now,
            updated_at: now,
        };

        match self.index.entry((entity_id, period)) {
            Entry::Occupied(mut occupied) => {
                let existing_id = *occupied.get();
                let existing = self
                    .batches
                    .get(&existing_id)
                    .map(|b| (b.status, b.file_hash.clone()));
                match existing {
                    // Cancelled occupant or dangling entry, slot is free.
                    Some((BatchStatus::Cancelled, _)) | None => {}
                    Some((_, existing_hash)) if existing_hash == batch.file_hash => {
                        return Err(BatchError::DuplicateUpload {
                            entity_id,
                            period,
                            existing: existing_id,
                        });
                    }
                    Some(_) => {
                        return Err(BatchError::PeriodOccupied {
                            entity_id,
                            period,
                            existing: existing_id,
                        });
                    }
                }
                *occupied.get_mut() = batch.id;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(batch.id);
            }
        }

        self.batches.insert(batch.id, batch.clone());
        Ok(batch)
    }

    /// Appends validated lines to a batch.
    pub fn insert_lines(&self, batch_id: BatchId, new_lines: Vec<LedgerLine>) {
        self.lines.entry(batch_id).or_default().extend(new_lines);
    }

    /// Appends alerts to a batch.
    pub fn insert_alerts(&self, batch_id: BatchId, new_alerts: Vec<Alert>) {
        self.alerts.entry(batch_id).or_default().extend(new_alerts);
    }

    /// Moves a batch to its terminal status and records its line count.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown batch.
    pub fn finalize(
        &self,
        batch_id: BatchId,
        status: BatchStatus,
        total_lines: usize,
    ) -> Result<UploadBatch, BatchError> {
        let mut batch = self
            .batches
            .get_mut(&batch_id)
            .ok_or(BatchError::NotFound(batch_id))?;
        batch.status = status;
        batch.total_lines = total_lines;
        batch.updated_at = Utc::now();
        Ok(batch.clone())
    }

    /// Cancels a batch and releases its (entity, period) slot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown batch.
    pub fn cancel(&self, batch_id: BatchId) -> Result<UploadBatch, BatchError> {
        let batch = {
            let mut batch = self
                .batches
                .get_mut(&batch_id)
                .ok_or(BatchError::NotFound(batch_id))?;
            batch.status = BatchStatus::Cancelled;
            batch.updated_at = Utc::now();
            batch.clone()
        };
        self.index
            .remove_if(&(batch.entity_id, batch.period), |_, id| *id == batch_id);
        Ok(batch)
    }

    /// Deletes a batch with its lines and alerts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown batch.
    pub fn delete(&self, batch_id: BatchId) -> Result<(), BatchError> {
        let (_, batch) = self
            .batches
            .remove(&batch_id)
            .ok_or(BatchError::NotFound(batch_id))?;
        self.lines.remove(&batch_id);
        self.alerts.remove(&batch_id);
        self.index
            .remove_if(&(batch.entity_id, batch.period), |_, id| *id == batch_id);
        Ok(())
    }

    /// Looks up a batch.
    #[must_use]
    pub fn get(&self, batch_id: BatchId) -> Option<UploadBatch> {
        self.batches.get(&batch_id).map(|b| b.clone())
    }

    /// The batch occupying an (entity, period) slot, if any.
    #[must_use]
    pub fn for_period(&self, entity_id: EntityId, period: Period) -> Option<UploadBatch> {
        let id = *self.index.get(&(entity_id, period))?;
        self.get(id)
    }

    /// All lines of a batch.
    #[must_use]
    pub fn lines_for(&self, batch_id: BatchId) -> Vec<LedgerLine> {
        self.lines
            .get(&batch_id)
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    /// All alerts of a batch.
    #[must_use]
    pub fn alerts_for(&self, batch_id: BatchId) -> Vec<Alert> {
        self.alerts
            .get(&batch_id)
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    /// Closing balance per account key for an entity's period.
    ///
    /// Empty when the slot has no reportable batch. Superseded duplicate
    /// lines are skipped.
    #[must_use]
    pub fn closing_balances(&self, entity_id: EntityId, period: Period) -> HashMap<LineKey, Decimal> {
        let Some(batch) = self.for_period(entity_id, period) else {
            return HashMap::new();
        };
        if !batch.status.is_reportable() {
            return HashMap::new();
        }
        self.lines_for(batch.id)
            .into_iter()
            .filter(|line| !line.is_duplicate)
            .map(|line| (line.key(), line.closing_balance))
            .collect()
    }

    /// Reportable lines for a year and month range, tagged with their
    /// entity and month.
    ///
    /// `entities` filters the scope; `None` means every entity. Cancelled
    /// and in-flight batches contribute nothing, and neither do duplicate
    /// lines.
    #[must_use]
    pub fn reportable_lines(
        &self,
        entities: Option<&[EntityId]>,
        year: i32,
        range: MonthRange,
    ) -> Vec<(EntityId, u32, LedgerLine)> {
        let mut out = Vec::new();
        for entry in &self.index {
            let (entity_id, period) = *entry.key();
            if period.year != year || !range.contains(period.month) {
                continue;
            }
            if let Some(filter) = entities {
                if !filter.contains(&entity_id) {
                    continue;
                }
            }
            let Some(batch) = self.get(*entry.value()) else {
                continue;
            };
            if !batch.status.is_reportable() {
                continue;
            }
            for line in self.lines_for(batch.id) {
                if !line.is_duplicate {
                    out.push((entity_id, period.month, line));
                }
            }
        }
        out
    }

    /// Years with at least one reportable batch, ascending.
    #[must_use]
    pub fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .index
            .iter()
            .filter(|entry| {
                self.get(*entry.value())
                    .is_some_and(|b| b.status.is_reportable())
            })
            .map(|entry| entry.key().1.year)
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Number of registered batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True when no batches are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AccountType, Classification};
    use rust_decimal_macros::dec;
    use saldo_shared::types::LineId;

    fn period(month: u32) -> Period {
        Period::new(2024, month).unwrap()
    }

    fn line(batch_id: BatchId, code: &str, closing: Decimal) -> LedgerLine {
        LedgerLine {
            id: LineId::new(),
            batch_id,
            classification: Classification::parse(code).unwrap(),
            account_number: "1".to_string(),
            sub_account: None,
            account_name: "CONTA".to_string(),
            account_type: AccountType::Asset,
            level: 1,
            is_heading: false,
            is_branch: false,
            opening_balance: Decimal::ZERO,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            closing_balance: closing,
            line_hash: String::new(),
            is_duplicate: false,
        }
    }

    #[test]
    fn test_duplicate_upload_rejected() {
        let store = BatchStore::new();
        let entity = EntityId::new();
        store.register(entity, period(1), "abc".to_string()).unwrap();

        let err = store
            .register(entity, period(1), "abc".to_string())
            .unwrap_err();
        assert!(matches!(err, BatchError::DuplicateUpload { .. }));
    }

    #[test]
    fn test_period_occupied_by_different_file() {
        let store = BatchStore::new();
        let entity = EntityId::new();
        store.register(entity, period(1), "abc".to_string()).unwrap();

        let err = store
            .register(entity, period(1), "def".to_string())
            .unwrap_err();
        assert!(matches!(err, BatchError::PeriodOccupied { .. }));
    }

    #[test]
    fn test_cancelled_batch_frees_the_slot() {
        let store = BatchStore::new();
        let entity = EntityId::new();
        let first = store.register(entity, period(1), "abc".to_string()).unwrap();
        store.cancel(first.id).unwrap();

        let second = store.register(entity, period(1), "abc".to_string()).unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(store.for_period(entity, period(1)).unwrap().id, second.id);
    }

    #[test]
    fn test_reportable_lines_skip_duplicates_and_processing() {
        let store = BatchStore::new();
        let entity = EntityId::new();
        let batch = store.register(entity, period(3), "abc".to_string()).unwrap();
        let mut dup = line(batch.id, "1.01", dec!(10));
        dup.is_duplicate = true;
        store.insert_lines(batch.id, vec![line(batch.id, "1.01", dec!(20)), dup]);

        // Still Processing, nothing reportable yet.
        assert!(store
            .reportable_lines(None, 2024, MonthRange::full_year())
            .is_empty());

        store.finalize(batch.id, BatchStatus::Completed, 2).unwrap();
        let lines = store.reportable_lines(None, 2024, MonthRange::full_year());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].1, 3);
        assert_eq!(lines[0].2.closing_balance, dec!(20));
    }

    #[test]
    fn test_closing_balances_for_continuity() {
        let store = BatchStore::new();
        let entity = EntityId::new();
        let batch = store.register(entity, period(2), "abc".to_string()).unwrap();
        store.insert_lines(batch.id, vec![line(batch.id, "1.01", dec!(150))]);
        store.finalize(batch.id, BatchStatus::Completed, 1).unwrap();

        let closings = store.closing_balances(entity, period(2));
        assert_eq!(
            closings.get(&("1.01".to_string(), "1".to_string(), String::new())),
            Some(&dec!(150))
        );
        assert!(store.closing_balances(entity, period(1)).is_empty());
    }

    #[test]
    fn test_delete_cascades() {
        let store = BatchStore::new();
        let entity = EntityId::new();
        let batch = store.register(entity, period(1), "abc".to_string()).unwrap();
        store.insert_lines(batch.id, vec![line(batch.id, "1", dec!(1))]);
        store.delete(batch.id).unwrap();

        assert!(store.get(batch.id).is_none());
        assert!(store.lines_for(batch.id).is_empty());
        assert!(store.for_period(entity, period(1)).is_none());
    }

    #[test]
    fn test_available_years() {
        let store = BatchStore::new();
        let entity = EntityId::new();
        let b1 = store.register(entity, period(1), "a".to_string()).unwrap();
        store.finalize(b1.id, BatchStatus::Completed, 0).unwrap();
        let b2 = store
            .register(entity, Period::new(2023, 12).unwrap(), "b".to_string())
            .unwrap();
        store.finalize(b2.id, BatchStatus::CompletedWithAlerts, 0).unwrap();
        // Processing batch does not count.
        store
            .register(entity, Period::new(2022, 5).unwrap(), "c".to_string())
            .unwrap();

        assert_eq!(store.available_years(), vec![2023, 2024]);
    }
}
