//! Report request and response shapes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use saldo_shared::types::{EntityId, MonthRange};

use crate::catalog::{AccountType, Classification};

/// Which entities feed the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    /// One entity.
    Entity(EntityId),
    /// An explicit set of entities.
    Entities(Vec<EntityId>),
    /// Every entity with reportable data.
    All,
}

impl ReportScope {
    /// The entity filter this scope implies, `None` meaning no filter.
    #[must_use]
    pub fn entity_filter(&self) -> Option<Vec<EntityId>> {
        match self {
            Self::Entity(id) => Some(vec![*id]),
            Self::Entities(ids) => Some(ids.clone()),
            Self::All => None,
        }
    }
}

/// Report flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    /// One branch on its own; requires a single-entity scope.
    Branch,
    /// Scope-wide aggregation per classification.
    Consolidated,
}

/// How a comparative value is taken from a period report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueMode {
    /// Sum over the whole month range.
    Accumulated,
    /// The terminal month of the range only.
    Period,
}

/// A period report request.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Calendar year.
    pub year: i32,
    /// Entities in scope.
    pub scope: ReportScope,
    /// Report flavor.
    pub kind: ReportKind,
    /// Months of the year to include.
    pub months: MonthRange,
    /// Restrict to one account nature, e.g. income statement only.
    pub account_type: Option<AccountType>,
    /// Case- and accent-insensitive account name filter.
    pub name_filter: Option<String>,
}

/// One account in the report tree.
#[derive(Debug, Clone, Serialize)]
pub struct ReportNode {
    /// Classification code.
    pub classification: Classification,
    /// Display name.
    pub name: String,
    /// Hierarchy depth.
    pub level: i32,
    /// True for nodes whose values are derived from children.
    pub is_heading: bool,
    /// Value per month present in the range.
    pub monthly: BTreeMap<u32, Decimal>,
    /// Sum across the months.
    pub total: Decimal,
    /// True when this subtree mixes sign-corrected and uncorrected leaves.
    pub sign_anomaly: bool,
    /// Child accounts, sorted by classification.
    pub children: Vec<ReportNode>,
}

/// A full period report.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    /// Calendar year.
    pub year: i32,
    /// Report flavor.
    pub kind: ReportKind,
    /// Months covered.
    pub months: MonthRange,
    /// False when no reportable line matched the request.
    pub has_data: bool,
    /// Root accounts of the classification tree.
    pub accounts: Vec<ReportNode>,
    /// Root-level total per month.
    pub monthly_totals: BTreeMap<u32, Decimal>,
    /// Sum of the monthly totals.
    pub grand_total: Decimal,
}

/// One account in a comparative report.
#[derive(Debug, Clone, Serialize)]
pub struct ComparativeNode {
    /// Classification code.
    pub classification: Classification,
    /// Display name.
    pub name: String,
    /// Hierarchy depth.
    pub level: i32,
    /// Value in the first window.
    pub value1: Decimal,
    /// Value in the second window.
    pub value2: Decimal,
    /// `value2 - value1`.
    pub difference: Decimal,
    /// Percentage change, `None` when the first value is zero.
    pub percentage: Option<Decimal>,
    /// Child accounts.
    pub children: Vec<ComparativeNode>,
}

/// Root totals of a comparative report.
#[derive(Debug, Clone, Serialize)]
pub struct ComparativeTotals {
    /// First-window total.
    pub value1: Decimal,
    /// Second-window total.
    pub value2: Decimal,
    /// `value2 - value1`.
    pub difference: Decimal,
    /// Percentage change, `None` when the first total is zero.
    pub percentage: Option<Decimal>,
}
