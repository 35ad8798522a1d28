//! Validation alerts raised while processing a batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saldo_shared::types::{AlertId, BatchId, LineId};

/// What the validator found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// Opening balance plus movements does not match the closing balance.
    BalanceMismatch,
    /// A mapped critical column was blank on a data row.
    EmptyCriticalField,
    /// The same account appeared more than once in the period.
    DuplicateAccountInPeriod,
    /// An account was seen for the first time ever.
    NewAccountDetected,
    /// The sheet layout drifted from the expected headers.
    HeaderChanged,
    /// Closing balance of the prior month does not carry into this one.
    TemporalContinuityMismatch,
}

/// How loudly the alert should surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Informational.
    Low,
    /// Worth a look.
    Medium,
    /// Blocks sign-off; flips the batch to `CompletedWithAlerts`.
    High,
}

/// Review workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    /// Freshly raised.
    Open,
    /// Someone is looking at it.
    UnderReview,
    /// Closed.
    Resolved,
}

/// One alert attached to a batch, and optionally to a specific line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Alert identifier.
    pub id: AlertId,
    /// Owning batch.
    pub batch_id: BatchId,
    /// Offending line, `None` for batch-level alerts.
    pub line_id: Option<LineId>,
    /// What was found.
    pub kind: AlertKind,
    /// How loud.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Review state.
    pub status: AlertStatus,
    /// When the alert was raised.
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Builds a freshly-opened alert.
    #[must_use]
    pub fn new(
        batch_id: BatchId,
        line_id: Option<LineId>,
        kind: AlertKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            batch_id,
            line_id,
            kind,
            severity,
            message: message.into(),
            status: AlertStatus::Open,
            created_at: Utc::now(),
        }
    }
}
