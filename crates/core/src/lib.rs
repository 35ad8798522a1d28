//! Trial-balance ingestion, validation and reporting engine.
//!
//! This crate contains pure engine logic with ZERO web or database dependencies.
//! Raw spreadsheet grids come in from an upload collaborator; validated ledger
//! lines, alerts and report trees come out.
//!
//! # Modules
//!
//! - `ingest` - Spreadsheet grid parsing, column mapping, locale number parsing
//! - `catalog` - Process-wide evolving chart-of-accounts catalog
//! - `validate` - Accounting-identity validation and alerting
//! - `batch` - Upload batch lifecycle, line store, serialized processing
//! - `report` - Period and comparative report builders
//! - `dashboard` - Canned aggregates over validated lines

pub mod batch;
pub mod catalog;
pub mod dashboard;
pub mod ingest;
pub mod report;
pub mod validate;
