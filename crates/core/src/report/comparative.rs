//! Two-window comparative reports.

use rust_decimal::Decimal;

use saldo_shared::types::MonthRange;

use super::builder::ReportBuilder;
use super::error::ReportError;
use super::types::{
    ComparativeNode, ComparativeTotals, PeriodReport, ReportKind, ReportNode, ReportRequest,
    ReportScope, ValueMode,
};

/// Shape constraint on the two comparison windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonKind {
    /// One month against one month.
    MonthToMonth,
    /// The same month range across two different years.
    YearToYear,
    /// Any two windows.
    Custom,
}

/// One comparison window: a year and a range of its months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// Calendar year.
    pub year: i32,
    /// Months of that year.
    pub months: MonthRange,
}

impl ReportWindow {
    fn label(&self) -> String {
        if self.months.first == self.months.last {
            format!("{:02}/{}", self.months.first, self.year)
        } else {
            format!("{:02}-{:02}/{}", self.months.first, self.months.last, self.year)
        }
    }
}

/// A comparative report request.
#[derive(Debug, Clone)]
pub struct ComparativeRequest {
    /// Entities in scope.
    pub scope: ReportScope,
    /// Window shape constraint.
    pub kind: ComparisonKind,
    /// How values are taken from each window.
    pub mode: ValueMode,
    /// First window.
    pub first: ReportWindow,
    /// Second window.
    pub second: ReportWindow,
    /// Restrict to one account nature.
    pub account_type: Option<crate::catalog::AccountType>,
    /// Accent-insensitive account-name filter, applied to both windows.
    pub name_filter: Option<String>,
}

/// A fully merged comparative report.
#[derive(Debug, Clone)]
pub struct ComparativeReport {
    /// Label of the first window, e.g. "01-06/2024".
    pub first_label: String,
    /// Label of the second window.
    pub second_label: String,
    /// Value extraction mode.
    pub mode: ValueMode,
    /// Merged account tree.
    pub accounts: Vec<ComparativeNode>,
    /// Root totals.
    pub totals: ComparativeTotals,
}

impl ComparativeRequest {
    fn validate(&self) -> Result<(), ReportError> {
        match self.kind {
            ComparisonKind::MonthToMonth => {
                let single = |w: &ReportWindow| w.months.first == w.months.last;
                if !single(&self.first) || !single(&self.second) {
                    return Err(ReportError::InvalidComparison(
                        "month-to-month windows must be single months".to_string(),
                    ));
                }
            }
            ComparisonKind::YearToYear => {
                if self.first.months != self.second.months {
                    return Err(ReportError::InvalidComparison(
                        "year-to-year windows must cover the same months".to_string(),
                    ));
                }
                if self.first.year == self.second.year {
                    return Err(ReportError::InvalidComparison(
                        "year-to-year windows must be in different years".to_string(),
                    ));
                }
            }
            ComparisonKind::Custom => {}
        }
        Ok(())
    }
}

impl ReportBuilder {
    /// Builds a comparative report over two windows.
    ///
    /// The two underlying period reports are built in parallel.
    ///
    /// # Errors
    ///
    /// Returns `InvalidComparison` when the windows do not satisfy the
    /// comparison kind, or any error of the underlying period builds.
    pub fn build_comparative(
        &self,
        request: &ComparativeRequest,
    ) -> Result<ComparativeReport, ReportError> {
        request.validate()?;

        let period_request = |window: &ReportWindow| ReportRequest {
            year: window.year,
            scope: request.scope.clone(),
            kind: ReportKind::Consolidated,
            months: window.months,
            account_type: request.account_type,
            name_filter: request.name_filter.clone(),
        };

        let (first, second) = rayon::join(
            || self.build(&period_request(&request.first)),
            || self.build(&period_request(&request.second)),
        );
        let (first, second) = (first?, second?);

        let accounts = merge_nodes(
            &first.accounts,
            &second.accounts,
            request.mode,
            &first,
            &second,
        );
        let value1 = report_value(&first, request.mode);
        let value2 = report_value(&second, request.mode);

        Ok(ComparativeReport {
            first_label: request.first.label(),
            second_label: request.second.label(),
            mode: request.mode,
            accounts,
            totals: ComparativeTotals {
                value1,
                value2,
                difference: value2 - value1,
                percentage: percentage_change(value1, value2),
            },
        })
    }
}

fn node_value(node: &ReportNode, mode: ValueMode, report: &PeriodReport) -> Decimal {
    match mode {
        ValueMode::Accumulated => node.total,
        ValueMode::Period => node
            .monthly
            .get(&report.months.terminal())
            .copied()
            .unwrap_or(Decimal::ZERO),
    }
}

fn report_value(report: &PeriodReport, mode: ValueMode) -> Decimal {
    match mode {
        ValueMode::Accumulated => report.grand_total,
        ValueMode::Period => report
            .monthly_totals
            .get(&report.months.terminal())
            .copied()
            .unwrap_or(Decimal::ZERO),
    }
}

/// Percentage change from `v1` to `v2`, `None` when `v1` is zero.
fn percentage_change(v1: Decimal, v2: Decimal) -> Option<Decimal> {
    if v1.is_zero() {
        return None;
    }
    Some(((v2 - v1) / v1.abs() * Decimal::ONE_HUNDRED).round_dp(2))
}

/// A matched pair of sibling nodes; at least one side is present.
enum Pair<'a> {
    Both(&'a ReportNode, &'a ReportNode),
    Left(&'a ReportNode),
    Right(&'a ReportNode),
}

/// Merges two sorted sibling lists over the union of their codes.
fn merge_nodes(
    left: &[ReportNode],
    right: &[ReportNode],
    mode: ValueMode,
    first: &PeriodReport,
    second: &PeriodReport,
) -> Vec<ComparativeNode> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    loop {
        let pair = match (left.get(i), right.get(j)) {
            (Some(a), Some(b)) if a.classification == b.classification => {
                i += 1;
                j += 1;
                Pair::Both(a, b)
            }
            (Some(a), Some(b)) if a.classification < b.classification => {
                i += 1;
                Pair::Left(a)
            }
            (Some(_), Some(b)) => {
                j += 1;
                Pair::Right(b)
            }
            (Some(a), None) => {
                i += 1;
                Pair::Left(a)
            }
            (None, Some(b)) => {
                j += 1;
                Pair::Right(b)
            }
            (None, None) => break,
        };
        out.push(merge_pair(&pair, mode, first, second));
    }
    out
}

fn merge_pair(
    pair: &Pair<'_>,
    mode: ValueMode,
    first: &PeriodReport,
    second: &PeriodReport,
) -> ComparativeNode {
    let (left, right) = match pair {
        Pair::Both(a, b) => (Some(*a), Some(*b)),
        Pair::Left(a) => (Some(*a), None),
        Pair::Right(b) => (None, Some(*b)),
    };
    let template = match pair {
        Pair::Both(a, _) | Pair::Left(a) => a,
        Pair::Right(b) => b,
    };

    let value1 = left.map_or(Decimal::ZERO, |n| node_value(n, mode, first));
    let value2 = right.map_or(Decimal::ZERO, |n| node_value(n, mode, second));
    let children = merge_nodes(
        left.map_or(&[][..], |n| &n.children),
        right.map_or(&[][..], |n| &n.children),
        mode,
        first,
        second,
    );

    ComparativeNode {
        classification: template.classification.clone(),
        name: template.name.clone(),
        level: template.level,
        value1,
        value2,
        difference: value2 - value1,
        percentage: percentage_change(value1, value2),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchStatus, BatchStore, LedgerLine};
    use crate::catalog::{AccountCatalog, AccountType, Classification};
    use rust_decimal_macros::dec;
    use rust_decimal::Decimal;
    use saldo_shared::config::ReportConfig;
    use saldo_shared::types::{EntityId, LineId, Period};
    use std::sync::Arc;

    fn line(code: &str, credit: Decimal) -> LedgerLine {
        LedgerLine {
            id: LineId::new(),
            batch_id: saldo_shared::types::BatchId::new(),
            classification: Classification::parse(code).unwrap(),
            account_number: "1".to_string(),
            sub_account: None,
            account_name: "RECEITA".to_string(),
            account_type: AccountType::IncomeStatement,
            level: 1,
            is_heading: false,
            is_branch: false,
            opening_balance: Decimal::ZERO,
            debit: Decimal::ZERO,
            credit,
            closing_balance: credit,
            line_hash: String::new(),
            is_duplicate: false,
        }
    }

    fn builder_with(uploads: &[(i32, u32, Vec<LedgerLine>)]) -> ReportBuilder {
        let store = Arc::new(BatchStore::new());
        let entity = EntityId::new();
        for (i, (year, month, lines)) in uploads.iter().enumerate() {
            let batch = store
                .register(entity, Period::new(*year, *month).unwrap(), format!("h{i}"))
                .unwrap();
            let owned: Vec<LedgerLine> = lines
                .iter()
                .map(|l| {
                    let mut l = l.clone();
                    l.batch_id = batch.id;
                    l
                })
                .collect();
            let count = owned.len();
            store.insert_lines(batch.id, owned);
            store.finalize(batch.id, BatchStatus::Completed, count).unwrap();
        }
        ReportBuilder::new(&ReportConfig::default(), store, Arc::new(AccountCatalog::new()))
    }

    fn month_window(year: i32, month: u32) -> ReportWindow {
        ReportWindow {
            year,
            months: MonthRange::single(month).unwrap(),
        }
    }

    fn request(first: ReportWindow, second: ReportWindow, kind: ComparisonKind) -> ComparativeRequest {
        ComparativeRequest {
            scope: ReportScope::All,
            kind,
            mode: ValueMode::Accumulated,
            first,
            second,
            account_type: None,
            name_filter: None,
        }
    }

    #[test]
    fn test_month_to_month_difference_and_percentage() {
        let b = builder_with(&[
            (2024, 1, vec![line("3.01", dec!(100))]),
            (2024, 2, vec![line("3.01", dec!(150))]),
        ]);
        let report = b
            .build_comparative(&request(
                month_window(2024, 1),
                month_window(2024, 2),
                ComparisonKind::MonthToMonth,
            ))
            .unwrap();

        assert_eq!(report.totals.value1, dec!(100));
        assert_eq!(report.totals.value2, dec!(150));
        assert_eq!(report.totals.difference, dec!(50));
        assert_eq!(report.totals.percentage, Some(dec!(50.00)));
        assert_eq!(report.first_label, "01/2024");
    }

    #[test]
    fn test_zero_base_percentage_is_none() {
        let b = builder_with(&[(2024, 2, vec![line("3.01", dec!(50))])]);
        let report = b
            .build_comparative(&request(
                month_window(2024, 1),
                month_window(2024, 2),
                ComparisonKind::MonthToMonth,
            ))
            .unwrap();

        assert_eq!(report.totals.value1, Decimal::ZERO);
        assert_eq!(report.totals.difference, dec!(50));
        assert_eq!(report.totals.percentage, None);
    }

    #[test]
    fn test_union_of_accounts() {
        let b = builder_with(&[
            (2024, 1, vec![line("3.01", dec!(100))]),
            (2024, 2, vec![line("3.02", dec!(40))]),
        ]);
        let report = b
            .build_comparative(&request(
                month_window(2024, 1),
                month_window(2024, 2),
                ComparisonKind::MonthToMonth,
            ))
            .unwrap();

        let root = &report.accounts[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].value1, dec!(100));
        assert_eq!(root.children[0].value2, Decimal::ZERO);
        assert_eq!(root.children[1].value2, dec!(40));
    }

    #[test]
    fn test_name_filter_applies_to_both_windows() {
        let mut servicos_jan = line("3.01", dec!(100));
        servicos_jan.account_name = "RECEITA DE SERVIÇOS".to_string();
        let mut outras_jan = line("3.02", dec!(30));
        outras_jan.account_name = "OUTRAS RECEITAS".to_string();
        let mut servicos_fev = line("3.01", dec!(150));
        servicos_fev.account_name = "RECEITA DE SERVIÇOS".to_string();

        let b = builder_with(&[
            (2024, 1, vec![servicos_jan, outras_jan]),
            (2024, 2, vec![servicos_fev]),
        ]);
        let mut req = request(
            month_window(2024, 1),
            month_window(2024, 2),
            ComparisonKind::MonthToMonth,
        );
        req.name_filter = Some("servicos".to_string());
        let report = b.build_comparative(&req).unwrap();

        // 3.02 is filtered out of both sides.
        assert_eq!(report.totals.value1, dec!(100));
        assert_eq!(report.totals.value2, dec!(150));
        assert_eq!(report.accounts[0].children.len(), 1);
    }

    #[test]
    fn test_month_to_month_rejects_ranges() {
        let b = builder_with(&[]);
        let err = b
            .build_comparative(&request(
                ReportWindow { year: 2024, months: MonthRange::new(1, 3).unwrap() },
                month_window(2024, 4),
                ComparisonKind::MonthToMonth,
            ))
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidComparison(_)));
    }

    #[test]
    fn test_year_to_year_window_rules() {
        let b = builder_with(&[]);
        let window = |year| ReportWindow { year, months: MonthRange::full_year() };

        assert!(b
            .build_comparative(&request(window(2023), window(2024), ComparisonKind::YearToYear))
            .is_ok());
        assert!(matches!(
            b.build_comparative(&request(window(2024), window(2024), ComparisonKind::YearToYear)),
            Err(ReportError::InvalidComparison(_))
        ));
    }

    #[test]
    fn test_accumulated_vs_period_mode() {
        let b = builder_with(&[
            (2024, 1, vec![line("3.01", dec!(100))]),
            (2024, 2, vec![line("3.01", dec!(30))]),
            (2023, 12, vec![line("3.01", dec!(10))]),
        ]);
        let window = ReportWindow {
            year: 2024,
            months: MonthRange::new(1, 2).unwrap(),
        };
        let base = request(month_window(2023, 12), window, ComparisonKind::Custom);

        let accumulated = b.build_comparative(&base).unwrap();
        assert_eq!(accumulated.totals.value2, dec!(130));

        let mut period = base;
        period.mode = ValueMode::Period;
        let report = b.build_comparative(&period).unwrap();
        assert_eq!(report.totals.value2, dec!(30));
        assert_eq!(report.totals.value1, dec!(10));
    }
}
