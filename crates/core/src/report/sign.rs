//! Sign reconciliation for report values.
//!
//! Accounting exports are inconsistent about the sign of reductive
//! accounts (deductions, costs, expenses). The report value of a leaf is
//! `credit - |debit|`; when that disagrees in sign with the reported
//! closing balance, the reported sign wins. Name keywords only kick in
//! for the zero-closing case, where there is no reported sign to follow.

use rust_decimal::Decimal;

use saldo_shared::config::ReportConfig;

use crate::ingest::normalize_header;

/// Keyword rules marking accounts of a negative nature.
#[derive(Debug, Clone)]
pub struct SignRules {
    keywords: Vec<String>,
}

impl SignRules {
    /// Builds the rules from configuration, normalizing the keywords.
    #[must_use]
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            keywords: config
                .negative_keywords
                .iter()
                .map(|k| normalize_header(k))
                .collect(),
        }
    }

    /// True when the account name reads as a reductive account.
    #[must_use]
    pub fn is_negative_nature(&self, account_name: &str) -> bool {
        let name = normalize_header(account_name);
        self.keywords.iter().any(|k| name.contains(k.as_str()))
    }
}

/// Resolves the report value of one leaf line.
///
/// Returns the value and whether a sign correction was applied.
#[must_use]
pub fn resolve_leaf_value(
    debit: Decimal,
    credit: Decimal,
    closing_balance: Decimal,
    account_name: &str,
    rules: &SignRules,
) -> (Decimal, bool) {
    let computed = credit - debit.abs();

    if closing_balance.is_zero() {
        if computed > Decimal::ZERO && rules.is_negative_nature(account_name) {
            return (-computed, true);
        }
        return (computed, false);
    }

    if !computed.is_zero() && computed.is_sign_negative() != closing_balance.is_sign_negative() {
        return (-computed, true);
    }
    (computed, false)
}
