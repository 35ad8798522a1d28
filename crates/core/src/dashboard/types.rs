//! Dashboard response shapes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use saldo_shared::types::EntityId;

use crate::catalog::{AccountType, CatalogStatus, Classification};

/// Month-by-month evolution of one classification for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySeries {
    /// Entity the series belongs to.
    pub entity_id: EntityId,
    /// Classification being tracked.
    pub classification: Classification,
    /// Closing balance per month with data.
    pub monthly: BTreeMap<u32, Decimal>,
    /// Closing balance of the latest month with data.
    pub latest: Decimal,
}

/// One hit of an account-name search.
#[derive(Debug, Clone, Serialize)]
pub struct AccountMatch {
    /// Classification code.
    pub classification: Classification,
    /// Display name.
    pub account_name: String,
    /// Account nature.
    pub account_type: AccountType,
    /// Catalog lifecycle status.
    pub status: CatalogStatus,
}
