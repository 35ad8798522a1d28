//! Row-by-row balance validation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use saldo_shared::config::ValidationConfig;
use saldo_shared::types::{BatchId, LineId};

use crate::batch::{LedgerLine, LineKey};
use crate::catalog::{AccountCatalog, AccountObservation, AccountType, Classification, UpsertOutcome};
use crate::ingest::{ColumnMap, Field, RawRow};

use super::alert::{Alert, AlertKind, Severity};

/// Result of validating a single row.
#[derive(Debug)]
pub struct RowOutcome {
    /// The persisted line, `None` when the row was rejected.
    pub line: Option<LedgerLine>,
    /// Alerts raised for the row.
    pub alerts: Vec<Alert>,
    /// When the row repeats an earlier account, the superseded line.
    pub duplicate_of: Option<LineId>,
}

/// Validates projected rows for one batch.
///
/// Stateful across rows: it tracks seen account keys for duplicate
/// detection and carries the previous period's closing balances for
/// temporal continuity checks.
pub struct BalanceValidator<'a> {
    config: ValidationConfig,
    catalog: &'a AccountCatalog,
    batch_id: BatchId,
    seen: HashMap<LineKey, LineId>,
    previous_closings: HashMap<LineKey, Decimal>,
}

impl<'a> BalanceValidator<'a> {
    /// Creates a validator for one batch.
    ///
    /// `previous_closings` holds the prior month's closing balance per
    /// account key; pass an empty map when there is no prior batch.
    #[must_use]
    pub fn new(
        config: ValidationConfig,
        catalog: &'a AccountCatalog,
        batch_id: BatchId,
        previous_closings: HashMap<LineKey, Decimal>,
    ) -> Self {
        Self {
            config,
            catalog,
            batch_id,
            seen: HashMap::new(),
            previous_closings,
        }
    }

    /// Validates one projected row.
    ///
    /// Rows missing classification, account number or account name are
    /// rejected with an `EmptyCriticalField` alert and produce no line.
    /// Malformed classification codes are rejected the same way.
    pub fn validate_row(&mut self, row: &RawRow) -> RowOutcome {
        let mut alerts = Vec::new();

        if !row.empty_cells.is_empty() {
            alerts.push(Alert::new(
                self.batch_id,
                None,
                AlertKind::EmptyCriticalField,
                Severity::Medium,
                format!(
                    "row {}: blank critical cells: {}",
                    row.row_number,
                    row.empty_cells.join(", ")
                ),
            ));
        }

        if !row.is_persistable() {
            return RowOutcome {
                line: None,
                alerts,
                duplicate_of: None,
            };
        }

        // is_persistable guarantees the three identifying fields.
        let raw_code = row.classification.as_deref().unwrap_or_default();
        let classification = match Classification::parse(raw_code) {
            Ok(code) => code,
            Err(err) => {
                alerts.push(Alert::new(
                    self.batch_id,
                    None,
                    AlertKind::EmptyCriticalField,
                    Severity::Medium,
                    format!("row {}: {err}", row.row_number),
                ));
                return RowOutcome {
                    line: None,
                    alerts,
                    duplicate_of: None,
                };
            }
        };

        let account_type = row
            .account_type
            .as_deref()
            .map_or(AccountType::Other, AccountType::parse);
        let level = row.level.unwrap_or_else(|| classification.level());

        let mut line = LedgerLine {
            id: LineId::new(),
            batch_id: self.batch_id,
            level,
            classification,
            account_number: row.account_number.clone().unwrap_or_default(),
            sub_account: row.sub_account.clone(),
            account_name: row.account_name.clone().unwrap_or_default(),
            account_type,
            is_heading: row.is_heading,
            is_branch: row.is_branch,
            opening_balance: row.opening_balance,
            debit: row.debit,
            credit: row.credit,
            closing_balance: row.closing_balance,
            line_hash: String::new(),
            is_duplicate: false,
        };
        line.line_hash = line.content_hash();

        self.check_balance(row, &line, &mut alerts);
        self.check_continuity(row, &line, &mut alerts);
        self.register_in_catalog(&line, &mut alerts);
        let duplicate_of = self.check_duplicate(row, &line, &mut alerts);

        RowOutcome {
            line: Some(line),
            alerts,
            duplicate_of,
        }
    }

    /// Checks `opening + debit + credit = closing` within tolerance.
    fn check_balance(&self, row: &RawRow, line: &LedgerLine, alerts: &mut Vec<Alert>) {
        let expected = line.opening_balance + line.debit + line.credit;
        let gap = (expected - line.closing_balance).abs();
        if gap <= self.config.balance_tolerance {
            return;
        }
        debug!(
            classification = %line.classification,
            %gap,
            "balance mismatch"
        );
        alerts.push(Alert::new(
            self.batch_id,
            Some(line.id),
            AlertKind::BalanceMismatch,
            self.mismatch_severity(gap),
            format!(
                "row {}: account {} expected closing {expected}, reported {}",
                row.row_number, line.classification, line.closing_balance
            ),
        ));
    }

    /// Checks that the prior month's closing carries into this opening.
    fn check_continuity(&self, row: &RawRow, line: &LedgerLine, alerts: &mut Vec<Alert>) {
        let Some(previous) = self.previous_closings.get(&line.key()) else {
            return;
        };
        let gap = (*previous - line.opening_balance).abs();
        if gap <= self.config.balance_tolerance {
            return;
        }
        alerts.push(Alert::new(
            self.batch_id,
            Some(line.id),
            AlertKind::TemporalContinuityMismatch,
            self.continuity_severity(gap),
            format!(
                "row {}: account {} opened with {}, previous month closed at {previous}",
                row.row_number, line.classification, line.opening_balance
            ),
        ));
    }

    /// Registers the account in the catalog, alerting on first sight.
    fn register_in_catalog(&self, line: &LedgerLine, alerts: &mut Vec<Alert>) {
        let outcome = self.catalog.upsert(
            AccountObservation {
                classification: line.classification.clone(),
                account_number: line.account_number.clone(),
                sub_account: line.sub_account.clone(),
                account_name: line.account_name.clone(),
                account_type: line.account_type,
            },
            chrono::Utc::now(),
        );
        if outcome == UpsertOutcome::Created {
            alerts.push(Alert::new(
                self.batch_id,
                Some(line.id),
                AlertKind::NewAccountDetected,
                Severity::Medium,
                format!(
                    "account {} ({}) seen for the first time",
                    line.classification, line.account_name
                ),
            ));
        }
    }

    /// Flags repeats of an account key within the batch.
    ///
    /// The latest row is canonical; the earlier line gets marked as the
    /// duplicate by the caller.
    fn check_duplicate(
        &mut self,
        row: &RawRow,
        line: &LedgerLine,
        alerts: &mut Vec<Alert>,
    ) -> Option<LineId> {
        let superseded = self.seen.insert(line.key(), line.id);
        if let Some(previous) = superseded {
            alerts.push(Alert::new(
                self.batch_id,
                Some(line.id),
                AlertKind::DuplicateAccountInPeriod,
                Severity::Medium,
                format!(
                    "row {}: account {} repeats within the period, superseding line {previous}",
                    row.row_number, line.classification
                ),
            ));
        }
        superseded
    }

    fn mismatch_severity(&self, gap: Decimal) -> Severity {
        if gap > self.config.high_severity_threshold {
            Severity::High
        } else if gap >= self.config.medium_severity_threshold {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    fn continuity_severity(&self, gap: Decimal) -> Severity {
        let ten = Decimal::from(10);
        if gap > self.config.high_severity_threshold * ten {
            Severity::High
        } else if gap > self.config.medium_severity_threshold * ten {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Fields a balancete sheet must map for validation to be meaningful.
const REQUIRED_FIELDS: &[(Field, &str)] = &[
    (Field::Classification, "Classificação"),
    (Field::AccountNumber, "Conta"),
    (Field::AccountName, "Nome da Conta"),
    (Field::OpeningBalance, "Saldo Anterior"),
    (Field::Debit, "Débito"),
    (Field::Credit, "Crédito"),
    (Field::ClosingBalance, "Saldo Atual"),
];

/// Extra headers some sources legitimately append; their presence is only
/// informational.
const KNOWN_EXTRA_HEADERS: &[&str] = &["MES", "UF"];

/// Compares the mapped headers against the expected layout.
///
/// Missing required columns raise one high-severity alert; unexpected new
/// columns raise a lower-severity one.
#[must_use]
pub fn detect_header_drift(
    batch_id: BatchId,
    headers: &[String],
    map: &ColumnMap,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|(field, _)| !map.is_mapped(*field))
        .map(|(_, label)| *label)
        .collect();
    if !missing.is_empty() {
        alerts.push(Alert::new(
            batch_id,
            None,
            AlertKind::HeaderChanged,
            Severity::High,
            format!("missing expected columns: {}", missing.join(", ")),
        ));
    }

    let unmatched = crate::ingest::unmatched_headers(headers);
    let (known, unknown): (Vec<String>, Vec<String>) = unmatched.into_iter().partition(|h| {
        KNOWN_EXTRA_HEADERS.contains(&crate::ingest::normalize_header(h).as_str())
    });

    if !known.is_empty() {
        alerts.push(Alert::new(
            batch_id,
            None,
            AlertKind::HeaderChanged,
            Severity::Low,
            format!("known extra columns present: {}", known.join(", ")),
        ));
    }
    if !unknown.is_empty() {
        let severity = if unknown.len() > 3 {
            Severity::High
        } else {
            Severity::Medium
        };
        alerts.push(Alert::new(
            batch_id,
            None,
            AlertKind::HeaderChanged,
            severity,
            format!("unrecognized columns: {}", unknown.join(", ")),
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::map_columns;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use saldo_shared::config::ValidationConfig;

    fn raw_row(code: &str, opening: Decimal, debit: Decimal, credit: Decimal, closing: Decimal) -> RawRow {
        RawRow {
            row_number: 1,
            classification: Some(code.to_string()),
            account_number: Some("745".to_string()),
            sub_account: None,
            account_name: Some("CAIXA".to_string()),
            account_type: Some("1-Ativo".to_string()),
            level: None,
            is_heading: false,
            is_branch: false,
            opening_balance: opening,
            debit,
            credit,
            closing_balance: closing,
            empty_cells: Vec::new(),
        }
    }

    fn validator<'a>(catalog: &'a AccountCatalog) -> BalanceValidator<'a> {
        BalanceValidator::new(
            ValidationConfig::default(),
            catalog,
            BatchId::new(),
            HashMap::new(),
        )
    }

    #[test]
    fn test_balanced_row_produces_line_and_new_account_alert() {
        let catalog = AccountCatalog::new();
        let mut v = validator(&catalog);
        let outcome = v.validate_row(&raw_row("1.01", dec!(100), dec!(50), dec!(-20), dec!(130)));

        let line = outcome.line.unwrap();
        assert_eq!(line.level, 2);
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].kind, AlertKind::NewAccountDetected);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_tolerance_absorbs_a_cent() {
        let catalog = AccountCatalog::new();
        let mut v = validator(&catalog);
        let outcome = v.validate_row(&raw_row("1.01", dec!(100), dec!(0), dec!(0), dec!(100.01)));
        assert!(!outcome
            .alerts
            .iter()
            .any(|a| a.kind == AlertKind::BalanceMismatch));
    }

    #[rstest]
    #[case(dec!(99.99), Severity::Low)]
    #[case(dec!(100.00), Severity::Medium)]
    #[case(dec!(1000.00), Severity::Medium)]
    #[case(dec!(1000.01), Severity::High)]
    fn test_mismatch_severity_thresholds(#[case] gap: Decimal, #[case] expected: Severity) {
        let catalog = AccountCatalog::new();
        let mut v = validator(&catalog);
        let outcome = v.validate_row(&raw_row("1.01", dec!(0), dec!(0), dec!(0), gap));
        let alert = outcome
            .alerts
            .iter()
            .find(|a| a.kind == AlertKind::BalanceMismatch)
            .unwrap();
        assert_eq!(alert.severity, expected);
    }

    #[test]
    fn test_missing_critical_fields_rejects_row() {
        let catalog = AccountCatalog::new();
        let mut v = validator(&catalog);
        let mut row = raw_row("1.01", dec!(0), dec!(0), dec!(0), dec!(0));
        row.classification = None;
        row.empty_cells = vec!["Classificação"];

        let outcome = v.validate_row(&row);
        assert!(outcome.line.is_none());
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].kind, AlertKind::EmptyCriticalField);
        assert_eq!(outcome.alerts[0].line_id, None);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_classification_rejects_row() {
        let catalog = AccountCatalog::new();
        let mut v = validator(&catalog);
        let outcome = v.validate_row(&raw_row("1..X", dec!(0), dec!(0), dec!(0), dec!(0)));
        assert!(outcome.line.is_none());
        assert_eq!(outcome.alerts[0].kind, AlertKind::EmptyCriticalField);
    }

    #[test]
    fn test_duplicate_supersedes_earlier_line() {
        let catalog = AccountCatalog::new();
        let mut v = validator(&catalog);
        let first = v.validate_row(&raw_row("1.01", dec!(100), dec!(0), dec!(0), dec!(100)));
        let first_id = first.line.unwrap().id;

        let second = v.validate_row(&raw_row("1.01", dec!(200), dec!(0), dec!(0), dec!(200)));
        assert_eq!(second.duplicate_of, Some(first_id));
        let alert = second
            .alerts
            .iter()
            .find(|a| a.kind == AlertKind::DuplicateAccountInPeriod)
            .unwrap();
        assert!(alert.message.contains(&first_id.to_string()));
    }

    #[test]
    fn test_continuity_mismatch_uses_scaled_thresholds() {
        let catalog = AccountCatalog::new();
        let mut previous = HashMap::new();
        previous.insert(
            ("1.01".to_string(), "745".to_string(), String::new()),
            dec!(5000),
        );
        let mut v = BalanceValidator::new(
            ValidationConfig::default(),
            &catalog,
            BatchId::new(),
            previous,
        );

        // Opens 2000 below last month's close: Medium on the x10 scale.
        let outcome = v.validate_row(&raw_row("1.01", dec!(3000), dec!(0), dec!(0), dec!(3000)));
        let alert = outcome
            .alerts
            .iter()
            .find(|a| a.kind == AlertKind::TemporalContinuityMismatch)
            .unwrap();
        assert_eq!(alert.severity, Severity::Medium);
    }

    #[test]
    fn test_continuity_match_is_silent() {
        let catalog = AccountCatalog::new();
        let mut previous = HashMap::new();
        previous.insert(
            ("1.01".to_string(), "745".to_string(), String::new()),
            dec!(100),
        );
        let mut v = BalanceValidator::new(
            ValidationConfig::default(),
            &catalog,
            BatchId::new(),
            previous,
        );
        let outcome = v.validate_row(&raw_row("1.01", dec!(100), dec!(0), dec!(0), dec!(100)));
        assert!(!outcome
            .alerts
            .iter()
            .any(|a| a.kind == AlertKind::TemporalContinuityMismatch));
    }

    #[test]
    fn test_header_drift() {
        let batch_id = BatchId::new();
        let headers: Vec<String> = ["Classificação", "Conta", "Mês", "Coluna Nova"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let map = map_columns(&headers);
        let alerts = detect_header_drift(batch_id, &headers, &map);

        assert!(alerts
            .iter()
            .any(|a| a.severity == Severity::High && a.message.contains("Saldo Atual")));
        assert!(alerts
            .iter()
            .any(|a| a.severity == Severity::Low && a.message.contains("Mês")));
        assert!(alerts
            .iter()
            .any(|a| a.severity == Severity::Medium && a.message.contains("Coluna Nova")));
    }

    #[test]
    fn test_clean_headers_raise_nothing() {
        let headers: Vec<String> = [
            "Classificação",
            "Conta",
            "Nome da conta contábil",
            "Saldo anterior",
            "Débito",
            "Crédito",
            "Saldo atual",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
        let map = map_columns(&headers);
        assert!(detect_header_drift(BatchId::new(), &headers, &map).is_empty());
    }
}
