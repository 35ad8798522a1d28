//! Row-level validation and alerting.

mod alert;
mod validator;

pub use alert::{Alert, AlertKind, AlertStatus, Severity};
pub use validator::{detect_header_drift, BalanceValidator, RowOutcome};
