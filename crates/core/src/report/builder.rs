//! Period report assembly from stored batches.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use saldo_shared::config::ReportConfig;

use crate::batch::BatchStore;
use crate::catalog::AccountCatalog;
use crate::ingest::normalize_header;

use super::error::ReportError;
use super::sign::{resolve_leaf_value, SignRules};
use super::tree::{build_tree, LeafSeed};
use super::types::{PeriodReport, ReportKind, ReportNode, ReportRequest, ReportScope};

/// Builds monthly report trees over the shared store and catalog.
pub struct ReportBuilder {
    store: Arc<BatchStore>,
    catalog: Arc<AccountCatalog>,
    rules: SignRules,
}

impl ReportBuilder {
    /// Creates a builder over shared handles.
    #[must_use]
    pub fn new(config: &ReportConfig, store: Arc<BatchStore>, catalog: Arc<AccountCatalog>) -> Self {
        Self {
            store,
            catalog,
            rules: SignRules::from_config(config),
        }
    }

    /// Builds one period report.
    ///
    /// Heading lines never seed values; every parent is recomputed from
    /// its children so sheet subtotals cannot double-count. A request that
    /// matches no line yields an empty report with `has_data` false.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScope` for a branch report over more than one
    /// entity.
    pub fn build(&self, request: &ReportRequest) -> Result<PeriodReport, ReportError> {
        if request.kind == ReportKind::Branch
            && !matches!(request.scope, ReportScope::Entity(_))
        {
            return Err(ReportError::InvalidScope);
        }

        let entities = request.scope.entity_filter();
        let lines = self
            .store
            .reportable_lines(entities.as_deref(), request.year, request.months);

        let name_filter = request
            .name_filter
            .as_deref()
            .map(normalize_header)
            .filter(|f| !f.is_empty());

        let mut seeds: BTreeMap<_, LeafSeed> = BTreeMap::new();
        let mut matched = 0_usize;
        for (_, month, line) in lines {
            if line.is_heading {
                continue;
            }
            if let Some(wanted) = request.account_type {
                if line.account_type != wanted {
                    continue;
                }
            }
            if let Some(filter) = &name_filter {
                if !normalize_header(&line.account_name).contains(filter.as_str()) {
                    continue;
                }
            }
            matched += 1;

            let (value, flipped) = resolve_leaf_value(
                line.debit,
                line.credit,
                line.closing_balance,
                &line.account_name,
                &self.rules,
            );
            let seed = seeds.entry(line.classification.clone()).or_default();
            *seed.monthly.entry(month).or_insert(Decimal::ZERO) += value;
            seed.lines += 1;
            seed.flipped += usize::from(flipped);
            if seed.name.is_none() {
                seed.name = Some(line.account_name.clone());
            }
        }

        debug!(year = request.year, matched, "report lines matched");

        let accounts = build_tree(seeds, &self.catalog);
        let (monthly_totals, grand_total) = root_totals(&accounts);

        Ok(PeriodReport {
            year: request.year,
            kind: request.kind,
            months: request.months,
            has_data: matched > 0,
            accounts,
            monthly_totals,
            grand_total,
        })
    }
}

/// Sums root nodes into per-month totals and a grand total.
fn root_totals(roots: &[ReportNode]) -> (BTreeMap<u32, Decimal>, Decimal) {
    let mut monthly: BTreeMap<u32, Decimal> = BTreeMap::new();
    for root in roots {
        for (month, value) in &root.monthly {
            *monthly.entry(*month).or_insert(Decimal::ZERO) += *value;
        }
    }
    let grand = monthly.values().copied().sum();
    (monthly, grand)
}
