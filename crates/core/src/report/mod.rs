//! Monthly and comparative financial reports.

mod builder;
#[cfg(test)]
mod builder_props;
mod comparative;
mod error;
mod sign;
mod tree;
mod types;

pub use builder::ReportBuilder;
pub use comparative::{ComparativeReport, ComparativeRequest, ComparisonKind, ReportWindow};
pub use error::ReportError;
pub use sign::{resolve_leaf_value, SignRules};
pub use types::{
    ComparativeNode, ComparativeTotals, PeriodReport, ReportKind, ReportNode, ReportRequest,
    ReportScope, ValueMode,
};
