//! Per-column classification pass.
//!
//! Produces one [`ColumnReport`] per input column and the coerced working
//! copy of the table. The input table is never modified.

use serde::Serialize;
use tracing::debug;

use crate::coerce::{classify_with_threshold, coerce, ColumnKind};
use crate::config::GridConfig;
use crate::model::{Cell, RawTable};
use crate::schema::{find_concept_value_columns, find_year_month_columns};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    pub label: String,
    pub kind: ColumnKind,
    pub non_null: usize,
    /// Convertible share of non-null values, in percent, two decimals.
    pub convertible_pct: f64,
    pub nulls_after_coercion: usize,
}

/// Coerced copy of the source table plus the columns that get number formats
/// on export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkingTable {
    pub table: RawTable,
    pub value_column: Option<usize>,
    pub year_column: Option<usize>,
    pub month_column: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub reports: Vec<ColumnReport>,
    pub working: WorkingTable,
}

impl Profile {
    pub fn report(&self, col: usize) -> Option<&ColumnReport> {
        self.reports.get(col)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Classify every column; numeric columns are coerced in the working copy
/// (unparseable cells become empty).
pub fn profile_table(table: &RawTable, config: &GridConfig) -> Profile {
    let mut working = table.clone();
    let mut reports = Vec::with_capacity(table.width());

    for (col, label) in table.columns().iter().enumerate() {
        let class = classify_with_threshold(table.column(col), config.numeric_threshold);
        if class.kind == ColumnKind::Numeric {
            working.map_column(col, |cell| coerce(cell).map(Cell::Number).unwrap_or(Cell::Empty));
        }
        let nulls_after_coercion = working.column(col).filter(|c| c.is_null()).count();
        reports.push(ColumnReport {
            label: label.to_string(),
            kind: class.kind,
            non_null: class.non_null,
            convertible_pct: round2(class.convertible_ratio * 100.0),
            nulls_after_coercion,
        });
    }

    let (year_column, month_column) = find_year_month_columns(table);
    let (_, value_column) = find_concept_value_columns(table);
    debug!(
        columns = reports.len(),
        numeric = reports.iter().filter(|r| r.kind == ColumnKind::Numeric).count(),
        "column profile"
    );

    Profile {
        reports,
        working: WorkingTable {
            table: working,
            value_column,
            year_column,
            month_column,
        },
    }
}
