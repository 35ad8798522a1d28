//! Dotted classification codes ("1.01.02.0001").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification code parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// Blank after trimming.
    #[error("classification code is empty")]
    Empty,
    /// A segment is blank or carries non-digit characters.
    #[error("malformed classification code: {0}")]
    Malformed(String),
}

/// Canonical trimming applied to every classification string before it is
/// used as a key: surrounding whitespace and a single trailing dot go away.
#[must_use]
pub fn normalize_raw(raw: &str) -> &str {
    raw.trim().trim_end_matches('.')
}

/// A validated, normalized classification code.
///
/// The hierarchy is positional: "1.01.02" is a child of "1.01", which is a
/// child of "1". Depth equals the number of dot-separated segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification(String);

impl Classification {
    /// Parses and normalizes a raw code.
    ///
    /// # Errors
    ///
    /// Returns `ClassificationError` when the code is blank or any segment
    /// is empty or non-numeric.
    pub fn parse(raw: &str) -> Result<Self, ClassificationError> {
        let normalized = normalize_raw(raw);
        if normalized.is_empty() {
            return Err(ClassificationError::Empty);
        }
        for segment in normalized.split('.') {
            if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
                return Err(ClassificationError::Malformed(raw.trim().to_string()));
            }
        }
        Ok(Self(normalized.to_string()))
    }

    /// The normalized code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hierarchy depth: number of dot-separated segments.
    #[must_use]
    pub fn level(&self) -> i32 {
        i32::try_from(self.0.split('.').count()).unwrap_or(i32::MAX)
    }

    /// The immediate parent code, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let idx = self.0.rfind('.')?;
        Some(Self(self.0[..idx].to_string()))
    }

    /// All ancestors from the immediate parent up to the root.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(code) = current {
            current = code.parent();
            out.push(code);
        }
        out
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Classification {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
