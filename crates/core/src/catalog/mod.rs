//! Master registry of classification accounts seen across uploads.

mod code;
mod store;
mod types;

pub use code::{normalize_raw, Classification, ClassificationError};
pub use store::{AccountCatalog, UpsertOutcome};
pub use types::{AccountObservation, AccountType, CatalogAccount, CatalogStatus};
