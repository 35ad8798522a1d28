//! Common value types shared across crates.

pub mod id;
pub mod period;

pub use id::{AlertId, BatchId, EntityId, LineId};
pub use period::{MonthRange, Period, PeriodError};
