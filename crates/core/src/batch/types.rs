//! Batch and ledger line records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use saldo_shared::types::{BatchId, EntityId, LineId, Period};

use crate::catalog::{AccountType, Classification};

/// Lifecycle status of an upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Being ingested and validated.
    Processing,
    /// Finished with no high-severity alert.
    Completed,
    /// Finished but at least one high-severity alert was raised.
    CompletedWithAlerts,
    /// Aborted, whether by the caller or by a structural failure.
    Cancelled,
}

impl BatchStatus {
    /// True when the batch's lines may feed reports.
    #[must_use]
    pub fn is_reportable(self) -> bool {
        matches!(self, Self::Completed | Self::CompletedWithAlerts)
    }
}

/// One monthly upload for an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadBatch {
    /// Batch identifier.
    pub id: BatchId,
    /// Owning entity.
    pub entity_id: EntityId,
    /// Competence period.
    pub period: Period,
    /// SHA-256 of the uploaded file, hex-encoded.
    pub file_hash: String,
    /// Lifecycle status.
    pub status: BatchStatus,
    /// Number of persisted lines.
    pub total_lines: usize,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Identity of a line within its period: classification, account number
/// and sub-account. Duplicate detection and temporal continuity key on it.
pub type LineKey = (String, String, String);

/// One validated balancete line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Line identifier.
    pub id: LineId,
    /// Owning batch.
    pub batch_id: BatchId,
    /// Normalized classification code.
    pub classification: Classification,
    /// Account number.
    pub account_number: String,
    /// Sub-account.
    pub sub_account: Option<String>,
    /// Display name.
    pub account_name: String,
    /// Account nature.
    pub account_type: AccountType,
    /// Hierarchy depth. Derived from the code when the sheet omits it.
    pub level: i32,
    /// Heading-row marker.
    pub is_heading: bool,
    /// Branch marker.
    pub is_branch: bool,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Period debit.
    pub debit: Decimal,
    /// Period credit.
    pub credit: Decimal,
    /// Reported closing balance.
    pub closing_balance: Decimal,
    /// Content hash of the identifying and monetary fields.
    pub line_hash: String,
    /// True when a later row in the same batch superseded this one.
    pub is_duplicate: bool,
}

impl LedgerLine {
    /// The line's duplicate-detection key.
    #[must_use]
    pub fn key(&self) -> LineKey {
        (
            self.classification.as_str().to_string(),
            self.account_number.clone(),
            self.sub_account.clone().unwrap_or_default(),
        )
    }

    /// Content hash over identity and monetary fields, hex-encoded.
    ///
    /// The payload is canonical JSON (sorted keys), so the hash is stable
    /// across runs and processes.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let payload = serde_json::json!({
            "classification": self.classification.as_str(),
            "account_number": self.account_number,
            "sub_account": self.sub_account,
            "opening_balance": self.opening_balance,
            "debit": self.debit,
            "credit": self.credit,
            "closing_balance": self.closing_balance,
        });
        hash_bytes(payload.to_string().as_bytes())
    }
}

/// SHA-256 of a byte slice, hex-encoded. Used for file dedup and line
/// content hashes.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
