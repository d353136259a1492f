//! Two-level header recovery for matrix-layout sheets.
//!
//! Split in three independently testable steps: locate the row holding the
//! "Concepto" label, generate the ordered (outer, inner) row pairings to
//! try, and judge whether a pairing produced a genuine two-level header.

use tracing::{debug, warn};

use crate::calendar::Month;
use crate::model::{Cell, ColumnLabel, RawTable, SheetGrid};

/// Rows scanned from the top of the sheet when looking for the label header.
pub const HEADER_SCAN_ROWS: usize = 25;

/// Label heading the concept column in matrix sheets.
pub const LABEL_HEADER: &str = "concepto";

/// Row indices forming the outer and inner header levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPairing {
    pub outer: usize,
    pub inner: usize,
}

pub(crate) fn is_label_header(text: &str) -> bool {
    text.trim().to_lowercase() == LABEL_HEADER
}

/// First row within `scan_rows` containing a cell equal to "Concepto".
pub fn find_label_row(grid: &SheetGrid, scan_rows: usize) -> Option<usize> {
    grid.rows()
        .iter()
        .take(scan_rows)
        .position(|row| row.iter().any(|c| is_label_header(&c.to_label())))
}

/// Pairings to try, in order: `[m, m+1]` then `[max(0, m-1), m]`.
pub fn header_candidates(label_row: usize) -> impl Iterator<Item = HeaderPairing> {
    [
        HeaderPairing {
            outer: label_row,
            inner: label_row + 1,
        },
        HeaderPairing {
            outer: label_row.saturating_sub(1),
            inner: label_row,
        },
    ]
    .into_iter()
}

/// Read the grid with a two-level header. Outer labels are forward-filled
/// across blanks (a merged year cell spans its months); inner labels are not.
/// `None` when the pairing is degenerate or out of range.
pub fn read_two_level(grid: &SheetGrid, pairing: HeaderPairing) -> Option<RawTable> {
    if pairing.outer == pairing.inner {
        return None;
    }
    let outer_row = grid.row(pairing.outer)?;
    let inner_row = grid.row(pairing.inner)?;

    let mut filled = String::new();
    let columns: Vec<ColumnLabel> = outer_row
        .iter()
        .zip(inner_row)
        .map(|(outer, inner)| {
            let outer = outer.to_label();
            if !outer.is_empty() {
                filled = outer;
            }
            ColumnLabel::Pair(filled.clone(), inner.to_label())
        })
        .collect();

    let data_start = pairing.outer.max(pairing.inner) + 1;
    let rows: Vec<Vec<Cell>> = grid
        .rows()
        .iter()
        .skip(data_start)
        .filter(|r| !r.iter().all(Cell::is_null))
        .cloned()
        .collect();

    Some(RawTable::new(columns, rows))
}

/// Outer header as a year, when it is purely digits.
pub(crate) fn year_of(outer: &str) -> Option<i32> {
    let outer = outer.trim();
    if outer.is_empty() || !outer.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    outer.parse().ok()
}

/// A genuine two-level header has at least one column whose outer label is a
/// year and whose inner label names a month. A data row read as the inner
/// level never qualifies.
pub fn is_genuine_two_level(table: &RawTable) -> bool {
    table.columns().iter().any(|col| match col {
        ColumnLabel::Pair(outer, inner) => year_of(outer).is_some() && Month::from_header(inner).is_some(),
        ColumnLabel::Single(_) => false,
    })
}

/// Locate the label row and return the first genuine two-level reading.
pub fn discover(grid: &SheetGrid, scan_rows: usize) -> Option<RawTable> {
    let Some(label_row) = find_label_row(grid, scan_rows) else {
        debug!(scan_rows, "no label header row found");
        return None;
    };

    for pairing in header_candidates(label_row) {
        match read_two_level(grid, pairing) {
            Some(table) if is_genuine_two_level(&table) => {
                debug!(?pairing, "accepted two-level header");
                return Some(table);
            }
            _ => debug!(?pairing, "rejected header pairing"),
        }
    }

    warn!(label_row, "label header found but no usable two-level header");
    None
}
