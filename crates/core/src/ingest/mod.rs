//! Spreadsheet ingestion boundary.
//!
//! Untyped cells are resolved into the [`Cell`] tagged union exactly once,
//! at this boundary; nothing downstream touches raw values again.

pub mod cell;
pub mod columns;
mod error;
pub mod number;
pub mod row;
pub mod sheet;

pub use cell::{Cell, Grid};
pub use columns::{map_columns, normalize_header, unmatched_headers, ColumnMap, Field};
pub use error::IngestError;
pub use number::{parse_cell_number, parse_flag, parse_level, parse_locale_number};
pub use row::{project_rows, RawRow};
pub use sheet::{detect_header_row, split_sheet, Sheet};
