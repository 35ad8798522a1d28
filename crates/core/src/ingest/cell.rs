//! Tagged cell union resolved at the ingestion boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw 2D cell grid as supplied by the upload collaborator.
pub type Grid = Vec<Vec<Cell>>;

/// One spreadsheet cell, already resolved from its untyped source value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum Cell {
    /// An empty cell (null, undefined, or blank string at the source).
    Empty,
    /// A textual cell.
    Text(String),
    /// A numeric cell.
    Number(Decimal),
    /// A cell of a type the decoder could not classify, kept verbatim.
    Unknown(String),
}

impl Cell {
    /// Returns true when the cell carries no usable content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) | Self::Unknown(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Returns the trimmed textual rendering of the cell, if any.
    ///
    /// Numbers render through `Decimal`'s display so account numbers read
    /// from numeric cells keep their digits.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) | Self::Unknown(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Self::Number(n) => Some(n.to_string()),
        }
    }

    /// Returns true when the cell reads as text that is not a plain number.
    ///
    /// Used by header detection: header cells are short labels, data cells
    /// are mostly numeric.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        match self {
            Self::Text(s) | Self::Unknown(s) => {
                let trimmed = s.trim();
                trimmed.len() > 2 && trimmed.parse::<Decimal>().is_err()
            }
            Self::Empty | Self::Number(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_is_empty() {
        assert!(Cell::Empty.is_empty());
        assert!(Cell::Text("   ".into()).is_empty());
        assert!(Cell::Unknown(String::new()).is_empty());
        assert!(!Cell::Text("x".into()).is_empty());
        assert!(!Cell::Number(Decimal::ZERO).is_empty());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Cell::Text("  1.01 ".into()).to_text().as_deref(), Some("1.01"));
        assert_eq!(Cell::Number(dec!(745)).to_text().as_deref(), Some("745"));
        assert_eq!(Cell::Empty.to_text(), None);
        assert_eq!(Cell::Text("  ".into()).to_text(), None);
    }

    #[test]
    fn test_is_textual() {
        assert!(Cell::Text("Saldo anterior".into()).is_textual());
        assert!(!Cell::Text("123".into()).is_textual());
        assert!(!Cell::Text("ab".into()).is_textual());
        assert!(!Cell::Number(dec!(1)).is_textual());
        assert!(!Cell::Empty.is_textual());
    }
}
