use tracing::debug;

use crate::alias::{AliasTable, Field, CONCEPT_ROWS, PERIOD_COLUMNS, SERIES_COLUMNS};
use crate::calendar::Month;
use crate::grid::Concept;
use crate::model::{Cell, RawTable};

/// Columns required by the long-format reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongSchema {
    pub year: usize,
    pub month: usize,
    pub concept: usize,
    pub value: usize,
}

fn labels(table: &RawTable) -> Vec<String> {
    table.columns().iter().map(|c| c.to_string()).collect()
}

/// Locate the year and month columns. Both or neither: a lone match is
/// reported as `(None, None)` since the long layout cannot use it.
pub fn find_year_month_columns(table: &RawTable) -> (Option<usize>, Option<usize>) {
    let labels = labels(table);
    let year = PERIOD_COLUMNS.find(Field::Year, &labels);
    let month = PERIOD_COLUMNS.find(Field::Month, &labels);
    match (year, month) {
        (Some(y), Some(m)) => (Some(y), Some(m)),
        _ => (None, None),
    }
}

/// Locate the concept-label and value columns by substring alias.
pub fn find_concept_value_columns(table: &RawTable) -> (Option<usize>, Option<usize>) {
    let labels = labels(table);
    (
        SERIES_COLUMNS.find(Field::Concept, &labels),
        SERIES_COLUMNS.find(Field::Value, &labels),
    )
}

/// All four long-format columns, or `None` when the layout does not apply.
pub fn detect_long_schema(table: &RawTable) -> Option<LongSchema> {
    let (year, month) = find_year_month_columns(table);
    let (concept, value) = find_concept_value_columns(table);
    debug!(?year, ?month, ?concept, ?value, "long-format column detection");
    Some(LongSchema {
        year: year?,
        month: month?,
        concept: concept?,
        value: value?,
    })
}

/// Month token → calendar month.
///
/// Numbers are taken as month numbers. Text is looked up by its first three
/// characters ("Ene", "mayo"), then parsed as a number. Anything outside
/// 1..=12 is absent.
pub fn normalize_month(raw: &Cell) -> Option<Month> {
    match raw {
        Cell::Empty => None,
        Cell::Number(n) => integral(*n).and_then(Month::from_number),
        Cell::Text(s) => {
            let s = s.trim();
            let prefix: String = s.chars().take(3).collect();
            Month::from_abbrev(&prefix).or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .and_then(integral)
                    .and_then(Month::from_number)
            })
        }
    }
}

fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

/// Year cell → integer year. Accepts "2023", 2023.0 and "2023,0".
pub fn parse_year(raw: &Cell) -> Option<i32> {
    crate::coerce::coerce(raw)
        .and_then(integral)
        .and_then(|y| i32::try_from(y).ok())
}

/// First label matching `concept` in `alias_table`, or `None`.
pub fn match_concept_row<S: AsRef<str>>(
    labels: &[S],
    alias_table: &AliasTable<Concept>,
    concept: Concept,
) -> Option<usize> {
    alias_table.find(concept, labels)
}

/// Row index per canonical concept, indexed by [`Concept::index`].
pub fn match_concept_rows<S: AsRef<str>>(labels: &[S]) -> [Option<usize>; 3] {
    let matches = Concept::ALL.map(|c| match_concept_row(labels, &CONCEPT_ROWS, c));
    debug!(?matches, "concept row matching");
    matches
}
