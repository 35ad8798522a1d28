//! Header row detection and grid splitting.

use tracing::debug;

use super::cell::{Cell, Grid};
use super::error::IngestError;

/// A grid split into a header row and its data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Cleaned header labels, one per column.
    pub headers: Vec<String>,
    /// Data rows below the header, fully-empty rows dropped.
    pub rows: Vec<Vec<Cell>>,
}

/// Locates the header row in the first `min(scan_rows, grid.len())` rows.
///
/// A row qualifies when it carries at least 3 textual cells (non-numeric
/// after trim, longer than 2 characters). Falls back to row 0 when no row
/// qualifies - accounting exports sometimes start straight at the header.
#[must_use]
pub fn detect_header_row(grid: &[Vec<Cell>], scan_rows: usize) -> usize {
    let limit = scan_rows.min(grid.len());
    for (idx, row) in grid.iter().take(limit).enumerate() {
        let text_cells = row.iter().filter(|cell| cell.is_textual()).count();
        if text_cells >= 3 {
            debug!(row = idx + 1, "header row detected");
            return idx;
        }
    }
    0
}

/// Splits a raw grid into header labels plus non-empty data rows.
///
/// Header cells that are blank get positional `Coluna_N` labels so the
/// column map stays index-stable.
///
/// # Errors
///
/// Returns `IngestError::EmptySource` when no data rows remain below the
/// detected header.
pub fn split_sheet(grid: Grid, scan_rows: usize) -> Result<Sheet, IngestError> {
    if grid.is_empty() {
        return Err(IngestError::EmptySource);
    }

    let header_idx = detect_header_row(&grid, scan_rows);
    let headers: Vec<String> = grid[header_idx]
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            cell.to_text()
                .unwrap_or_else(|| format!("Coluna_{}", idx + 1))
        })
        .collect();

    let rows: Vec<Vec<Cell>> = grid
        .into_iter()
        .skip(header_idx + 1)
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    if rows.is_empty() {
        return Err(IngestError::EmptySource);
    }

    Ok(Sheet { headers, rows })
}
