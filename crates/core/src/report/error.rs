//! Report building errors.

use thiserror::Error;

use saldo_shared::error::AppError;
use saldo_shared::types::PeriodError;

/// Failures while building a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A branch report needs exactly one entity in scope.
    #[error("branch reports require a single entity scope")]
    InvalidScope,

    /// The two comparison windows do not fit the comparison kind.
    #[error("invalid comparison windows: {0}")]
    InvalidComparison(String),

    /// An invalid month or range reached the builder.
    #[error(transparent)]
    Period(#[from] PeriodError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidScope | ReportError::InvalidComparison(_) => {
                Self::BusinessRule(err.to_string())
            }
            ReportError::Period(_) => Self::Validation(err.to_string()),
        }
    }
}
