//! Concurrent account catalog keyed by classification code.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::info;

use super::code::Classification;
use super::types::{AccountObservation, CatalogAccount, CatalogStatus};

/// Result of a catalog upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First time this classification was seen.
    Created,
    /// Metadata refreshed on an existing entry.
    Refreshed,
}

/// Shared, thread-safe master catalog.
///
/// Keys are normalized classification codes, so "1.01." and " 1.01" land
/// on the same entry. Metadata refreshes are last-writer-wins.
#[derive(Debug, Default)]
pub struct AccountCatalog {
    accounts: DashMap<String, CatalogAccount>,
}

impl AccountCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observation, creating the entry or refreshing it.
    ///
    /// Status moves monotonically towards `Active`: `New` and `Archived`
    /// entries become `Active` on re-observation, `Active` stays put.
    pub fn upsert(&self, obs: AccountObservation, now: DateTime<Utc>) -> UpsertOutcome {
        let key = obs.classification.as_str().to_string();
        let mut outcome = UpsertOutcome::Refreshed;
        self.accounts
            .entry(key)
            .and_modify(|entry| {
                entry.account_number = obs.account_number.clone();
                entry.sub_account = obs.sub_account.clone();
                entry.account_name = obs.account_name.clone();
                entry.account_type = obs.account_type;
                entry.last_seen_at = now;
                entry.status = CatalogStatus::Active;
            })
            .or_insert_with(|| {
                outcome = UpsertOutcome::Created;
                CatalogAccount {
                    level: obs.classification.level(),
                    classification: obs.classification,
                    account_number: obs.account_number,
                    sub_account: obs.sub_account,
                    account_name: obs.account_name,
                    account_type: obs.account_type,
                    status: CatalogStatus::New,
                    first_seen_at: now,
                    last_seen_at: now,
                }
            });
        outcome
    }

    /// Archives `Active` entries not observed within the window.
    ///
    /// Returns how many entries were archived.
    pub fn archive_stale(&self, now: DateTime<Utc>, window_days: i64) -> usize {
        let cutoff = now - Duration::days(window_days);
        let mut archived = 0;
        for mut entry in self.accounts.iter_mut() {
            if entry.status == CatalogStatus::Active && entry.last_seen_at < cutoff {
                entry.status = CatalogStatus::Archived;
                archived += 1;
            }
        }
        if archived > 0 {
            info!(archived, window_days, "archived stale catalog accounts");
        }
        archived
    }

    /// Looks up an entry by its classification code.
    #[must_use]
    pub fn get(&self, classification: &Classification) -> Option<CatalogAccount> {
        self.accounts
            .get(classification.as_str())
            .map(|entry| entry.clone())
    }

    /// Number of catalogued accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when no accounts are catalogued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// A point-in-time copy of all entries, sorted by classification.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CatalogAccount> {
        let mut all: Vec<CatalogAccount> =
            self.accounts.iter().map(|entry| entry.clone()).collect();
        all.sort_by(|a, b| a.classification.cmp(&b.classification));
        all
    }
}
