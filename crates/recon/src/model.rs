use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A raw cell as handed over by ingestion: text, number, or nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Null means empty, or text that is blank after trimming.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Render the cell as a header/label string. Integral numbers drop the
    /// fractional part so a year typed as 2023 reads back as "2023".
    pub fn to_label(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

// ---------------------------------------------------------------------------
// Column labels
// ---------------------------------------------------------------------------

/// A column header: one label, or an (outer, inner) pair from a two-level header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ColumnLabel {
    Single(String),
    Pair(String, String),
}

impl ColumnLabel {
    pub fn outer(&self) -> &str {
        match self {
            Self::Single(s) => s,
            Self::Pair(outer, _) => outer,
        }
    }

    pub fn inner(&self) -> Option<&str> {
        match self {
            Self::Single(_) => None,
            Self::Pair(_, inner) => Some(inner),
        }
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(s) => write!(f, "{s}"),
            Self::Pair(outer, inner) if inner.is_empty() => write!(f, "{outer}"),
            Self::Pair(outer, inner) => write!(f, "{outer} {inner}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Ordered columns plus ordered rows. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<ColumnLabel>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table, padding short rows with empty cells and truncating long ones.
    pub fn new(columns: Vec<ColumnLabel>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Convenience for single-level headers.
    pub fn with_labels<S: AsRef<str>>(labels: &[S], rows: Vec<Vec<Cell>>) -> Self {
        let columns = labels
            .iter()
            .map(|l| ColumnLabel::Single(l.as_ref().to_string()))
            .collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Checked cell access; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |r| r.get(col).unwrap_or(&EMPTY))
    }

    /// Rewrite every cell of one column. Only used on working copies.
    pub(crate) fn map_column(&mut self, col: usize, mut f: impl FnMut(&Cell) -> Cell) {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(col) {
                *cell = f(cell);
            }
        }
    }
}

/// Header-less rectangular reading of a sheet, row 0 = first sheet row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetGrid {
    rows: Vec<Vec<Cell>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Read the grid with `header_row` as a single-level header; data starts below it.
    pub fn with_header_row(&self, header_row: usize) -> RawTable {
        let Some(header) = self.row(header_row) else {
            return RawTable::default();
        };
        let labels: Vec<String> = header.iter().map(Cell::to_label).collect();
        let rows = self.rows[header_row + 1..]
            .iter()
            .filter(|r| !r.iter().all(Cell::is_null))
            .cloned()
            .collect();
        RawTable::with_labels(&labels, rows)
    }

    /// Default reading: the first non-empty row is the header.
    pub fn to_table(&self) -> RawTable {
        match self.rows.iter().position(|r| !r.iter().all(Cell::is_null)) {
            Some(header_row) => self.with_header_row(header_row),
            None => RawTable::default(),
        }
    }
}

/// Everything ingestion hands to the core for one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceReading {
    pub table: RawTable,
    /// Header-less reading of the same sheet, when the source supports one.
    pub grid: Option<SheetGrid>,
}

impl SourceReading {
    pub fn from_grid(grid: SheetGrid) -> Self {
        Self {
            table: grid.to_table(),
            grid: Some(grid),
        }
    }

    pub fn from_table(table: RawTable) -> Self {
        Self { table, grid: None }
    }
}
