//! Accounting periods and month ranges.
//!
//! A `Period` is one (year, month) pair; a `MonthRange` is an inclusive
//! span of months inside a single year, used by report builders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors building periods and ranges.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// Month outside 1..=12.
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    /// Range whose first month is after its last month.
    #[error("Range start {first} is after range end {last}")]
    InvertedRange {
        /// First month of the range.
        first: u32,
        /// Last month of the range.
        last: u32,
    },
}

/// One accounting month of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

/// Unvalidated wire shape of a [`Period`].
#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPeriod> for Period {
    type Error = PeriodError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
    }
}

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

impl Period {
    /// Creates a period, validating the month.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidMonth` when month is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Returns the immediately preceding period.
    ///
    /// January rolls over to December of the prior year, which is what
    /// temporal-continuity validation needs at year boundaries.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Returns the month name in Portuguese, e.g. "Janeiro".
    ///
    /// Out-of-range months (possible only through a literal construction
    /// that bypassed [`Period::new`]) yield a placeholder instead of a
    /// panic.
    #[must_use]
    pub fn month_name(self) -> &'static str {
        usize::try_from(self.month)
            .ok()
            .and_then(|m| m.checked_sub(1))
            .and_then(|idx| MONTH_NAMES.get(idx))
            .copied()
            .unwrap_or("Mês inválido")
    }

    /// Returns a "Janeiro/2024"-style label.
    #[must_use]
    pub fn label(self) -> String {
        format!("{}/{}", self.month_name(), self.year)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// An inclusive span of months inside one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    /// First month of the range (1-12).
    pub first: u32,
    /// Last month of the range (1-12), inclusive.
    pub last: u32,
}

impl MonthRange {
    /// Creates a range, validating both months and their order.
    ///
    /// # Errors
    ///
    /// Returns an error when a month is invalid or the range is inverted.
    pub fn new(first: u32, last: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&first) {
            return Err(PeriodError::InvalidMonth(first));
        }
        if !(1..=12).contains(&last) {
            return Err(PeriodError::InvalidMonth(last));
        }
        if first > last {
            return Err(PeriodError::InvertedRange { first, last });
        }
        Ok(Self { first, last })
    }

    /// The full-year range, the default for period reports.
    #[must_use]
    pub const fn full_year() -> Self {
        Self { first: 1, last: 12 }
    }

    /// A single-month range.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidMonth` when the month is invalid.
    pub fn single(month: u32) -> Result<Self, PeriodError> {
        Self::new(month, month)
    }

    /// Returns true when the month falls inside this range.
    #[must_use]
    pub fn contains(self, month: u32) -> bool {
        (self.first..=self.last).contains(&month)
    }

    /// Iterates over the months of the range.
    pub fn months(self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }

    /// The last (terminal) month, used by period-mode comparative values.
    #[must_use]
    pub const fn terminal(self) -> u32 {
        self.last
    }
}

impl Default for MonthRange {
    fn default() -> Self {
        Self::full_year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(12, true)]
    #[case(13, false)]
    fn test_month_validation(#[case] month: u32, #[case] valid: bool) {
        assert_eq!(Period::new(2024, month).is_ok(), valid);
        if !valid {
            assert_eq!(Period::new(2024, month), Err(PeriodError::InvalidMonth(month)));
        }
    }

    #[test]
    fn test_deserialization_revalidates_month() {
        assert!(Period::try_from(RawPeriod { year: 2024, month: 0 }).is_err());
        assert!(Period::try_from(RawPeriod { year: 2024, month: 13 }).is_err());
        assert_eq!(
            Period::try_from(RawPeriod { year: 2024, month: 7 }),
            Ok(Period::new(2024, 7).unwrap())
        );
    }

    #[test]
    fn test_month_name_survives_invalid_month() {
        let broken = Period { year: 2024, month: 0 };
        assert_eq!(broken.month_name(), "Mês inválido");
    }

    #[test]
    fn test_previous_within_year() {
        let p = Period::new(2024, 6).unwrap();
        assert_eq!(p.previous(), Period::new(2024, 5).unwrap());
    }

    #[test]
    fn test_previous_january_rolls_to_december() {
        let p = Period::new(2024, 1).unwrap();
        assert_eq!(p.previous(), Period::new(2023, 12).unwrap());
    }

    #[test]
    fn test_labels() {
        let p = Period::new(2024, 2).unwrap();
        assert_eq!(p.month_name(), "Fevereiro");
        assert_eq!(p.label(), "Fevereiro/2024");
        assert_eq!(p.to_string(), "02/2024");
    }

    #[test]
    fn test_range_validation() {
        assert!(MonthRange::new(3, 6).is_ok());
        assert_eq!(
            MonthRange::new(6, 3),
            Err(PeriodError::InvertedRange { first: 6, last: 3 })
        );
        assert_eq!(MonthRange::new(0, 3), Err(PeriodError::InvalidMonth(0)));
    }

    #[test]
    fn test_range_contains_and_months() {
        let r = MonthRange::new(4, 6).unwrap();
        assert!(r.contains(4));
        assert!(r.contains(6));
        assert!(!r.contains(7));
        assert_eq!(r.months().collect::<Vec<_>>(), vec![4, 5, 6]);
        assert_eq!(r.terminal(), 6);
    }

    #[test]
    fn test_full_year_default() {
        assert_eq!(MonthRange::default(), MonthRange::full_year());
        assert_eq!(MonthRange::full_year().months().count(), 12);
    }
}
