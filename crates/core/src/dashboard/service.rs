//! Dashboard query implementations.

use std::collections::BTreeMap;

use std::sync::Arc;

use rust_decimal::Decimal;

use saldo_shared::types::{EntityId, MonthRange};

use crate::batch::BatchStore;
use crate::catalog::{AccountCatalog, AccountType, Classification};
use crate::ingest::normalize_header;

use super::types::{AccountMatch, MonthlySeries};

/// Maximum hits returned by an account-name search.
const SEARCH_LIMIT: usize = 20;

/// Read-only queries backing the dashboard views.
pub struct DashboardService {
    store: Arc<BatchStore>,
    catalog: Arc<AccountCatalog>,
}

impl DashboardService {
    /// Creates the service over shared handles.
    #[must_use]
    pub fn new(store: Arc<BatchStore>, catalog: Arc<AccountCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Years that have at least one reportable batch.
    #[must_use]
    pub fn available_years(&self) -> Vec<i32> {
        self.store.available_years()
    }

    /// Closing-balance evolution of one classification across a year,
    /// one series per entity, sorted by entity id.
    ///
    /// Duplicate lines are already excluded at the store. Sub-accounts of
    /// the same classification are summed per month.
    #[must_use]
    pub fn classification_series(&self, classification: &Classification, year: i32) -> Vec<MonthlySeries> {
        let mut per_entity: BTreeMap<EntityId, BTreeMap<u32, Decimal>> = BTreeMap::new();
        for (entity_id, month, line) in
            self.store.reportable_lines(None, year, MonthRange::full_year())
        {
            if line.classification != *classification {
                continue;
            }
            *per_entity
                .entry(entity_id)
                .or_default()
                .entry(month)
                .or_insert(Decimal::ZERO) += line.closing_balance;
        }

        per_entity
            .into_iter()
            .map(|(entity_id, monthly)| {
                let latest = monthly
                    .last_key_value()
                    .map_or(Decimal::ZERO, |(_, v)| *v);
                MonthlySeries {
                    entity_id,
                    classification: classification.clone(),
                    monthly,
                    latest,
                }
            })
            .collect()
    }

    /// Case- and accent-insensitive search over catalogued account names.
    ///
    /// Results are sorted by classification and capped at 20 hits.
    #[must_use]
    pub fn search_account_names(
        &self,
        query: &str,
        account_type: Option<AccountType>,
    ) -> Vec<AccountMatch> {
        let needle = normalize_header(query);
        if needle.is_empty() {
            return Vec::new();
        }

        self.catalog
            .snapshot()
            .into_iter()
            .filter(|account| {
                account_type.map_or(true, |t| account.account_type == t)
                    && normalize_header(&account.account_name).contains(needle.as_str())
            })
            .take(SEARCH_LIMIT)
            .map(|account| AccountMatch {
                classification: account.classification,
                account_name: account.account_name,
                account_type: account.account_type,
                status: account.status,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchStatus, LedgerLine};
    use crate::catalog::{AccountObservation, CatalogStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use saldo_shared::types::{LineId, Period};

    fn line(code: &str, closing: Decimal) -> LedgerLine {
        LedgerLine {
            id: LineId::new(),
            batch_id: saldo_shared::types::BatchId::new(),
            classification: Classification::parse(code).unwrap(),
            account_number: "1".to_string(),
            sub_account: None,
            account_name: "CAIXA".to_string(),
            account_type: AccountType::Asset,
            level: 1,
            is_heading: false,
            is_branch: false,
            opening_balance: Decimal::ZERO,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            closing_balance: closing,
            line_hash: String::new(),
            is_duplicate: false,
        }
    }

    fn service_with(uploads: &[(EntityId, u32, Vec<LedgerLine>)]) -> DashboardService {
        let store = Arc::new(BatchStore::new());
        for (i, (entity, month, lines)) in uploads.iter().enumerate() {
            let batch = store
                .register(*entity, Period::new(2024, *month).unwrap(), format!("h{i}"))
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
        DashboardService::new(store, Arc::new(AccountCatalog::new()))
    }

    #[test]
    fn test_classification_series_per_entity() {
        let entity = EntityId::new();
        let service = service_with(&[
            (entity, 1, vec![line("1.01", dec!(100))]),
            (entity, 2, vec![line("1.01", dec!(150)), line("1.02", dec!(999))]),
        ]);

        let series = service.classification_series(&Classification::parse("1.01").unwrap(), 2024);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].monthly.get(&1), Some(&dec!(100)));
        assert_eq!(series[0].monthly.get(&2), Some(&dec!(150)));
        assert_eq!(series[0].latest, dec!(150));
    }

    #[test]
    fn test_series_for_unknown_code_is_empty() {
        let service = service_with(&[]);
        assert!(service
            .classification_series(&Classification::parse("9.99").unwrap(), 2024)
            .is_empty());
    }

    #[test]
    fn test_search_account_names() {
        let service = service_with(&[]);
        let now = Utc::now();
        service.catalog.upsert(
            AccountObservation {
                classification: Classification::parse("3.01").unwrap(),
                account_number: "1".to_string(),
                sub_account: None,
                account_name: "RECEITA DE SERVIÇOS".to_string(),
                account_type: AccountType::IncomeStatement,
            },
            now,
        );
        service.catalog.upsert(
            AccountObservation {
                classification: Classification::parse("1.01").unwrap(),
                account_number: "2".to_string(),
                sub_account: None,
                account_name: "CAIXA".to_string(),
                account_type: AccountType::Asset,
            },
            now,
        );

        let hits = service.search_account_names("servicos", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].classification.as_str(), "3.01");
        assert_eq!(hits[0].status, CatalogStatus::New);

        let typed = service.search_account_names("a", Some(AccountType::Asset));
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].account_name, "CAIXA");

        assert!(service.search_account_names("  ", None).is_empty());
    }
}
