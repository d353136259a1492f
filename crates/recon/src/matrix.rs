use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::calendar::Month;
use crate::coerce::coerce;
use crate::grid::{CanonicalGrid, YearBlock};
use crate::header::{is_label_header, year_of};
use crate::model::{Cell, RawTable};
use crate::schema::match_concept_rows;

/// Index of the concept label column: outer header "Concepto", else column 0.
pub fn label_column(table: &RawTable) -> usize {
    table
        .columns()
        .iter()
        .position(|c| is_label_header(c.outer()))
        .unwrap_or(0)
}

/// Build the canonical grid from a two-level (year, month) header table.
pub fn reconcile(table: &RawTable) -> CanonicalGrid {
    if table.width() == 0 {
        return CanonicalGrid::skeleton();
    }
    let label_col = label_column(table);

    // First column wins when a (year, month) pair repeats.
    let mut cells: HashMap<(i32, Month), usize> = HashMap::new();
    let mut periods: BTreeMap<i32, Vec<Month>> = BTreeMap::new();
    for (col, label) in table.columns().iter().enumerate() {
        if col == label_col {
            continue;
        }
        let Some(year) = year_of(label.outer()) else {
            continue;
        };
        let Some(month) = label.inner().and_then(Month::from_header) else {
            continue;
        };
        if let Entry::Vacant(slot) = cells.entry((year, month)) {
            slot.insert(col);
            periods.entry(year).or_default().push(month);
        }
    }

    let labels: Vec<String> = table.column(label_col).map(Cell::to_label).collect();
    let matches = match_concept_rows(&labels);
    debug!(
        label_col,
        years = periods.len(),
        columns = cells.len(),
        "matrix-format header"
    );

    let candidates = periods
        .into_iter()
        .map(|(year, months)| YearBlock::new(year, months));

    CanonicalGrid::from_fn(candidates, |concept, year, month| {
        let row = matches[concept.index()]?;
        let col = *cells.get(&(year, month))?;
        coerce(table.cell(row, col))
    })
}
