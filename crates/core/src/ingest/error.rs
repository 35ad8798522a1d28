//! Ingestion error types.

use thiserror::Error;

/// Structural errors raised before any line is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    /// The grid has no data rows below the detected header.
    #[error("Spreadsheet has no data rows")]
    EmptySource,
}

impl From<IngestError> for saldo_shared::AppError {
    fn from(err: IngestError) -> Self {
        Self::Validation(err.to_string())
    }
}
