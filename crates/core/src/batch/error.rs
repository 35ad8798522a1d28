//! Batch processing errors.

use thiserror::Error;

use saldo_shared::error::AppError;
use saldo_shared::types::{BatchId, EntityId, Period};

use crate::ingest::IngestError;

/// Failures while registering or processing a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The source grid could not be ingested.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A batch with the same file hash already exists for this period.
    #[error("file already uploaded for entity {entity_id} in {period}")]
    DuplicateUpload {
        /// Entity the duplicate belongs to.
        entity_id: EntityId,
        /// Competence period.
        period: Period,
        /// The existing batch.
        existing: BatchId,
    },

    /// A different, non-cancelled batch already occupies this period.
    #[error("period {period} of entity {entity_id} already has batch {existing}")]
    PeriodOccupied {
        /// Entity the period belongs to.
        entity_id: EntityId,
        /// Competence period.
        period: Period,
        /// The occupying batch.
        existing: BatchId,
    },

    /// Another upload for the same entity and period is in flight.
    #[error("a batch for entity {entity_id} in {period} is already processing")]
    AlreadyProcessing {
        /// Entity being processed.
        entity_id: EntityId,
        /// Competence period.
        period: Period,
    },

    /// Unknown batch id.
    #[error("batch {0} not found")]
    NotFound(BatchId),
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Ingest(inner) => inner.into(),
            BatchError::DuplicateUpload { .. }
            | BatchError::PeriodOccupied { .. }
            | BatchError::AlreadyProcessing { .. } => Self::Conflict(err.to_string()),
            BatchError::NotFound(_) => Self::NotFound(err.to_string()),
        }
    }
}
