//! Lenient locale-aware number parsing.
//!
//! Balancete exports use Brazilian formatting: `.` for thousands, `,` for
//! the decimal separator (e.g. "1.797.148,78" or "-3.197.869,88"). A bad
//! cell must never abort the batch - it parses to zero and surfaces later
//! as an `EmptyCriticalField` or `BalanceMismatch` alert.

use rust_decimal::Decimal;

use super::cell::Cell;

/// Parses a locale-formatted numeric string, returning 0 when blank or
/// unparseable.
#[must_use]
pub fn parse_locale_number(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    // Thousands dots go away, the decimal comma becomes a dot, everything
    // else that is not a digit, sign or dot is stripped (currency symbols,
    // spaces).
    let cleaned: String = trimmed
        .replace('.', "")
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    cleaned.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Parses a cell into a decimal, passing numeric cells through unchanged.
#[must_use]
pub fn parse_cell_number(cell: &Cell) -> Decimal {
    match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) | Cell::Unknown(s) => parse_locale_number(s),
        Cell::Empty => Decimal::ZERO,
    }
}

/// Extracts a hierarchy level from values like `"3"` or `"2-Não"`.
///
/// Returns `None` when no leading integer is present.
#[must_use]
pub fn parse_level(cell: &Cell) -> Option<i32> {
    let text = cell.to_text()?;
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Parses a boolean marker cell ("Sim", "S", "X", "1", "true").
#[must_use]
pub fn parse_flag(cell: &Cell) -> bool {
    match cell {
        Cell::Number(n) => *n == Decimal::ONE,
        Cell::Text(s) | Cell::Unknown(s) => {
            matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "1" | "sim" | "s" | "x"
            )
        }
        Cell::Empty => false,
    }
}
