//! Header-to-field column mapping.
//!
//! Matching is driven by an ordered, declarative rule table evaluated in
//! fixed precedence. When several headers match the same field the last
//! match wins - accounting exports occasionally repeat a column and the
//! rightmost copy is the populated one.

use std::collections::HashMap;

/// Canonical semantic fields a spreadsheet column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Dotted classification code ("Classificação").
    Classification,
    /// Account number ("Conta").
    AccountNumber,
    /// Sub-account ("Sub").
    SubAccount,
    /// Account display name ("Nome da conta contábil").
    AccountName,
    /// Account type label ("Tipo conta").
    AccountType,
    /// Hierarchy level ("Nível").
    Level,
    /// Heading-row marker ("Cta. título").
    Heading,
    /// Branch marker ("Estab.").
    Branch,
    /// Opening balance ("Saldo anterior").
    OpeningBalance,
    /// Period debit ("Débito").
    Debit,
    /// Period credit ("Crédito").
    Credit,
    /// Closing balance ("Saldo atual" / "Saldo final").
    ClosingBalance,
    /// Unit price, used by sales-style sheets.
    UnitPrice,
    /// Total value, used by sales-style sheets.
    TotalValue,
}

/// One keyword rule: a header maps to `field` when it contains every
/// `all_of` keyword, at least one `any_of` keyword (when non-empty), and
/// none of the `none_of` keywords.
#[derive(Debug)]
pub struct ColumnRule {
    /// Target canonical field.
    pub field: Field,
    /// Keywords that must all be present.
    pub all_of: &'static [&'static str],
    /// Keywords of which at least one must be present (empty = no constraint).
    pub any_of: &'static [&'static str],
    /// Keywords that must all be absent.
    pub none_of: &'static [&'static str],
}

/// The ordered rule table. Keywords are written accent-folded uppercase,
/// the same normalization applied to headers.
pub const COLUMN_RULES: &[ColumnRule] = &[
    ColumnRule {
        field: Field::Classification,
        all_of: &["CLASSIFICACAO"],
        any_of: &[],
        none_of: &[],
    },
    ColumnRule {
        field: Field::AccountNumber,
        all_of: &["CONTA"],
        any_of: &[],
        none_of: &["SUB", "NOME", "TITULO", "TIPO"],
    },
    ColumnRule {
        field: Field::SubAccount,
        all_of: &["SUB"],
        any_of: &[],
        none_of: &["TOTAL"],
    },
    ColumnRule {
        field: Field::AccountName,
        all_of: &["NOME"],
        any_of: &["CONTA", "CONTABIL"],
        none_of: &[],
    },
    ColumnRule {
        field: Field::AccountType,
        all_of: &["TIPO", "CONTA"],
        any_of: &[],
        none_of: &[],
    },
    ColumnRule {
        field: Field::Level,
        all_of: &["NIVEL"],
        any_of: &[],
        none_of: &[],
    },
    ColumnRule {
        field: Field::Heading,
        all_of: &["TITULO"],
        any_of: &[],
        none_of: &[],
    },
    ColumnRule {
        field: Field::Branch,
        all_of: &[],
        any_of: &["ESTAB"],
        none_of: &[],
    },
    ColumnRule {
        field: Field::OpeningBalance,
        all_of: &["SALDO", "ANTERIOR"],
        any_of: &[],
        none_of: &[],
    },
    ColumnRule {
        field: Field::Debit,
        all_of: &["DEBITO"],
        any_of: &[],
        none_of: &[],
    },
    ColumnRule {
        field: Field::Credit,
        all_of: &["CREDITO"],
        any_of: &[],
        none_of: &[],
    },
    ColumnRule {
        field: Field::ClosingBalance,
        all_of: &["SALDO"],
        any_of: &["ATUAL", "FINAL"],
        none_of: &[],
    },
    // Unit price is suppressed when the header also reads as a total or a
    // net ("líquido") amount, which belongs to TotalValue.
    ColumnRule {
        field: Field::UnitPrice,
        all_of: &[],
        any_of: &["UNITARIO", "VALOR UNIT", "PRECO UNIT"],
        none_of: &["TOTAL", "LIQ"],
    },
    ColumnRule {
        field: Field::TotalValue,
        all_of: &["TOTAL"],
        any_of: &[],
        none_of: &["SUB"],
    },
];

/// Mapping from canonical field to column index.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    slots: HashMap<Field, usize>,
}

impl ColumnMap {
    /// Returns the column index mapped to `field`, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<usize> {
        self.slots.get(&field).copied()
    }

    /// Returns true when `field` has a mapped column.
    #[must_use]
    pub fn is_mapped(&self, field: Field) -> bool {
        self.slots.contains_key(&field)
    }

    /// Number of mapped fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true when nothing mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Normalizes a header for keyword matching: trim, uppercase, fold accents.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .map(fold_accent)
        .collect()
}

/// Folds the accented characters seen in Brazilian accounting exports.
const fn fold_accent(c: char) -> char {
    match c {
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ç' => 'C',
        other => other,
    }
}

fn rule_matches(rule: &ColumnRule, header: &str) -> bool {
    rule.all_of.iter().all(|kw| header.contains(kw))
        && (rule.any_of.is_empty() || rule.any_of.iter().any(|kw| header.contains(kw)))
        && !rule.none_of.iter().any(|kw| header.contains(kw))
}

/// Maps header labels to canonical fields.
///
/// Never fails; fields without a matching header simply stay unmapped.
/// Required-field enforcement is the caller's responsibility.
#[must_use]
pub fn map_columns(headers: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (idx, raw) in headers.iter().enumerate() {
        let header = normalize_header(raw);
        if header.is_empty() {
            continue;
        }
        for rule in COLUMN_RULES {
            if rule_matches(rule, &header) {
                // Last match wins, by policy.
                map.slots.insert(rule.field, idx);
            }
        }
    }
    map
}

/// Returns the headers that matched no rule at all.
///
/// Header-drift alerting treats these as unexpected new columns.
#[must_use]
pub fn unmatched_headers(headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .filter(|raw| {
            let header = normalize_header(raw);
            !header.is_empty() && !COLUMN_RULES.iter().any(|rule| rule_matches(rule, &header))
        })
        .cloned()
        .collect()
}
