//! Projection of data rows through the column map.

use rust_decimal::Decimal;

use super::cell::Cell;
use super::columns::{ColumnMap, Field};
use super::number::{parse_cell_number, parse_flag, parse_level};
use super::sheet::Sheet;

/// One data row projected into canonical fields.
///
/// Blank cells in critical columns are recorded by label so validation can
/// raise `EmptyCriticalField` alerts without re-reading the grid.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based row number within the data rows, for alert messages.
    pub row_number: usize,
    /// Dotted classification code.
    pub classification: Option<String>,
    /// Account number.
    pub account_number: Option<String>,
    /// Optional sub-account.
    pub sub_account: Option<String>,
    /// Account display name.
    pub account_name: Option<String>,
    /// Raw account type label (e.g. "3-DRE").
    pub account_type: Option<String>,
    /// Hierarchy level when the sheet provides one.
    pub level: Option<i32>,
    /// Heading-row marker.
    pub is_heading: bool,
    /// Branch marker.
    pub is_branch: bool,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Period debit.
    pub debit: Decimal,
    /// Period credit, sign as supplied by the source.
    pub credit: Decimal,
    /// Reported closing balance.
    pub closing_balance: Decimal,
    /// Labels of mapped critical columns whose cell was blank.
    pub empty_cells: Vec<&'static str>,
}

fn cell<'a>(row: &'a [Cell], map: &ColumnMap, field: Field) -> Option<&'a Cell> {
    map.get(field).and_then(|idx| row.get(idx))
}

fn text_field(
    row: &[Cell],
    map: &ColumnMap,
    field: Field,
    label: &'static str,
    empty_cells: &mut Vec<&'static str>,
) -> Option<String> {
    let cell = cell(row, map, field)?;
    match cell.to_text() {
        Some(text) => Some(text),
        None => {
            empty_cells.push(label);
            None
        }
    }
}

fn number_field(
    row: &[Cell],
    map: &ColumnMap,
    field: Field,
    label: &'static str,
    empty_cells: &mut Vec<&'static str>,
) -> Decimal {
    match cell(row, map, field) {
        Some(c) if !c.is_empty() => parse_cell_number(c),
        Some(_) => {
            empty_cells.push(label);
            Decimal::ZERO
        }
        None => Decimal::ZERO,
    }
}

/// Projects every data row of a sheet through the column map.
#[must_use]
pub fn project_rows(sheet: &Sheet, map: &ColumnMap) -> Vec<RawRow> {
    sheet
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| project_row(idx + 1, row, map))
        .collect()
}

fn project_row(row_number: usize, row: &[Cell], map: &ColumnMap) -> RawRow {
    let mut empty_cells = Vec::new();

    let classification = text_field(row, map, Field::Classification, "Classificação", &mut empty_cells);
    let account_number = text_field(row, map, Field::AccountNumber, "Conta", &mut empty_cells);
    // Sub-account is genuinely optional, no alert when blank.
    let sub_account = cell(row, map, Field::SubAccount).and_then(Cell::to_text);
    let account_name = text_field(row, map, Field::AccountName, "Nome da Conta", &mut empty_cells);
    let account_type = text_field(row, map, Field::AccountType, "Tipo Conta", &mut empty_cells);

    let level = match cell(row, map, Field::Level) {
        Some(c) if !c.is_empty() => parse_level(c),
        Some(_) => {
            empty_cells.push("Nível");
            None
        }
        None => None,
    };

    let is_heading = cell(row, map, Field::Heading).is_some_and(parse_flag);
    let is_branch = cell(row, map, Field::Branch).is_some_and(parse_flag);

    let opening_balance =
        number_field(row, map, Field::OpeningBalance, "Saldo Anterior", &mut empty_cells);
    let debit = number_field(row, map, Field::Debit, "Débito", &mut empty_cells);
    let credit = number_field(row, map, Field::Credit, "Crédito", &mut empty_cells);
    let closing_balance =
        number_field(row, map, Field::ClosingBalance, "Saldo Atual", &mut empty_cells);

    RawRow {
        row_number,
        classification,
        account_number,
        sub_account,
        account_name,
        account_type,
        level,
        is_heading,
        is_branch,
        opening_balance,
        debit,
        credit,
        closing_balance,
        empty_cells,
    }
}

impl RawRow {
    /// Returns true when the row has the minimum identifying fields to be
    /// persisted as a ledger line.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        self.classification.is_some() && self.account_number.is_some() && self.account_name.is_some()
    }
}
