//! Dashboard queries: evolution series, available years, name search.

mod service;
mod types;

pub use service::DashboardService;
pub use types::{AccountMatch, MonthlySeries};
