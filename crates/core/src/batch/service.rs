//! The batch processing pipeline.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use saldo_shared::config::EngineConfig;
use saldo_shared::types::{EntityId, Period};

use crate::catalog::AccountCatalog;
use crate::ingest::{map_columns, project_rows, split_sheet, Grid};
use crate::validate::{detect_header_drift, BalanceValidator, Severity};

use super::error::BatchError;
use super::progress::{CancellationToken, ProgressHandle, Stage};
use super::store::BatchStore;
use super::types::{hash_bytes, BatchStatus, LedgerLine, UploadBatch};

/// Runs uploads through ingestion, validation and persistence.
///
/// At most one upload per (entity, period) is processed at a time; a
/// second caller gets `AlreadyProcessing` instead of queueing.
pub struct BatchProcessor {
    config: EngineConfig,
    catalog: Arc<AccountCatalog>,
    store: Arc<BatchStore>,
    in_flight: DashMap<(EntityId, Period), ()>,
}

/// Releases the in-flight slot when processing ends, on any path.
struct ProcessingGuard<'a> {
    locks: &'a DashMap<(EntityId, Period), ()>,
    key: (EntityId, Period),
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.locks.remove(&self.key);
    }
}

impl BatchProcessor {
    /// Creates a processor over shared catalog and store handles.
    #[must_use]
    pub fn new(config: EngineConfig, catalog: Arc<AccountCatalog>, store: Arc<BatchStore>) -> Self {
        Self {
            config,
            catalog,
            store,
            in_flight: DashMap::new(),
        }
    }

    fn acquire(&self, entity_id: EntityId, period: Period) -> Result<ProcessingGuard<'_>, BatchError> {
        use dashmap::mapref::entry::Entry;
        match self.in_flight.entry((entity_id, period)) {
            Entry::Occupied(_) => Err(BatchError::AlreadyProcessing { entity_id, period }),
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Ok(ProcessingGuard {
                    locks: &self.in_flight,
                    key: (entity_id, period),
                })
            }
        }
    }

    /// Processes one uploaded spreadsheet for an entity's period.
    ///
    /// Structural failures (empty sheet) cancel the batch before any line
    /// is written. Cooperative cancellation keeps the rows validated so
    /// far and finishes the batch as `Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` on registration conflicts, a concurrent upload
    /// for the same slot, or a structurally unreadable source.
    pub fn process(
        &self,
        entity_id: EntityId,
        period: Period,
        file_bytes: &[u8],
        grid: Grid,
        progress: &ProgressHandle,
        cancel: &CancellationToken,
    ) -> Result<UploadBatch, BatchError> {
        let _guard = self.acquire(entity_id, period)?;

        let file_hash = hash_bytes(file_bytes);
        let batch = self.store.register(entity_id, period, file_hash)?;
        info!(batch_id = %batch.id, %entity_id, %period, "batch registered");

        progress.set_stage(Stage::Reading);
        let sheet = match split_sheet(grid, self.config.ingest.header_scan_rows) {
            Ok(sheet) => sheet,
            Err(err) => {
                warn!(batch_id = %batch.id, %err, "structural ingest failure");
                progress.set_stage(Stage::Failed);
                self.store.cancel(batch.id)?;
                return Err(err.into());
            }
        };

        let map = map_columns(&sheet.headers);
        let mut alerts = detect_header_drift(batch.id, &sheet.headers, &map);

        let previous_closings = self.store.closing_balances(entity_id, period.previous());
        let rows = project_rows(&sheet, &map);
        progress.set_total(rows.len());
        progress.set_stage(Stage::Validating);

        let mut validator = BalanceValidator::new(
            self.config.validation.clone(),
            &self.catalog,
            batch.id,
            previous_closings,
        );

        let mut lines: Vec<LedgerLine> = Vec::with_capacity(rows.len());
        let mut cancelled = false;
        for row in &rows {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let outcome = validator.validate_row(row);
            alerts.extend(outcome.alerts);
            if let Some(superseded) = outcome.duplicate_of {
                if let Some(earlier) = lines.iter_mut().find(|l| l.id == superseded) {
                    earlier.is_duplicate = true;
                }
            }
            if let Some(line) = outcome.line {
                lines.push(line);
            }
            progress.row_done();
        }

        progress.set_stage(Stage::Persisting);
        let total_lines = lines.len();
        self.store.insert_lines(batch.id, lines);
        let high_alerts = alerts
            .iter()
            .filter(|a| a.severity == Severity::High)
            .count();
        self.store.insert_alerts(batch.id, alerts);

        if cancelled {
            info!(batch_id = %batch.id, total_lines, "batch cancelled mid-flight");
            progress.set_stage(Stage::Cancelled);
            return self.store.cancel(batch.id);
        }

        let status = if high_alerts > 0 {
            BatchStatus::CompletedWithAlerts
        } else {
            BatchStatus::Completed
        };
        let finished = self.store.finalize(batch.id, status, total_lines)?;
        progress.set_stage(Stage::Done);
        info!(
            batch_id = %finished.id,
            total_lines,
            high_alerts,
            status = ?finished.status,
            "batch processed"
        );
        Ok(finished)
    }

    /// The shared store handle.
    #[must_use]
    pub fn store(&self) -> &Arc<BatchStore> {
        &self.store
    }

    /// The shared catalog handle.
    #[must_use]
    pub fn catalog(&self) -> &Arc<AccountCatalog> {
        &self.catalog
    }
}
