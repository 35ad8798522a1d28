//! Catalog entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::code::Classification;

/// Broad account nature derived from the source type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Balance-sheet asset ("1-Ativo").
    Asset,
    /// Balance-sheet liability ("2-Passivo").
    Liability,
    /// Equity ("PL", "Patrimônio").
    Equity,
    /// Income statement account ("3-DRE").
    IncomeStatement,
    /// Anything else, kept rather than rejected.
    Other,
}

impl AccountType {
    /// Classifies a raw type label like `"3-DRE"` or `"1-Ativo"`.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        let upper = label.trim().to_uppercase();
        if upper.contains("DRE") || upper.contains("RESULTADO") {
            Self::IncomeStatement
        } else if upper.contains("ATIVO") {
            Self::Asset
        } else if upper.contains("PASSIVO") {
            Self::Liability
        } else if upper.contains("PATRIMONIO") || upper.contains("PATRIMÔNIO") || upper == "PL" {
            Self::Equity
        } else {
            Self::Other
        }
    }

    /// True for accounts that belong on the income statement.
    #[must_use]
    pub fn is_income_statement(self) -> bool {
        matches!(self, Self::IncomeStatement)
    }
}

/// Lifecycle status of a catalog entry.
///
/// Transitions are monotonic towards `Active`: a new account starts as
/// `New`, becomes `Active` the next time it is observed, and an `Archived`
/// account reactivates on sight. `Active` never regresses to `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogStatus {
    /// First observation, pending review.
    New,
    /// Seen in more than one upload.
    Active,
    /// Not observed within the archival window.
    Archived,
}

/// One master-catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogAccount {
    /// Normalized classification code, the catalog key.
    pub classification: Classification,
    /// Account number from the latest observation.
    pub account_number: String,
    /// Sub-account, if the source carries one.
    pub sub_account: Option<String>,
    /// Display name from the latest observation.
    pub account_name: String,
    /// Account nature.
    pub account_type: AccountType,
    /// Hierarchy depth.
    pub level: i32,
    /// Lifecycle status.
    pub status: CatalogStatus,
    /// When the account was first observed.
    pub first_seen_at: DateTime<Utc>,
    /// When the account was last observed.
    pub last_seen_at: DateTime<Utc>,
}

/// Input for a catalog upsert, taken from one validated row.
#[derive(Debug, Clone)]
pub struct AccountObservation {
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
}
