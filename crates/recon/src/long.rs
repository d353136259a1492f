use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::calendar::Month;
use crate::coerce::coerce;
use crate::grid::{CanonicalGrid, Concept, YearBlock};
use crate::model::RawTable;
use crate::schema::{match_concept_rows, normalize_month, parse_year, LongSchema};

/// (source label index, year, month)
type ObservationKey = (usize, i32, Month);

/// Build the canonical grid from a one-observation-per-row table.
///
/// Rows with an unusable month, year or concept label are discarded. When
/// several rows share (concept label, year, month) the first value in row
/// order is kept.
pub fn reconcile(table: &RawTable, schema: &LongSchema) -> CanonicalGrid {
    let mut labels: Vec<String> = Vec::new();
    let mut label_index: HashMap<String, usize> = HashMap::new();
    let mut observations: HashMap<ObservationKey, f64> = HashMap::new();
    let mut discarded = 0usize;

    for row in 0..table.height() {
        let Some(month) = normalize_month(table.cell(row, schema.month)) else {
            discarded += 1;
            continue;
        };
        let Some(year) = parse_year(table.cell(row, schema.year)) else {
            discarded += 1;
            continue;
        };
        let label = table.cell(row, schema.concept).to_label();
        if label.is_empty() {
            discarded += 1;
            continue;
        }
        let Some(value) = coerce(table.cell(row, schema.value)) else {
            continue;
        };

        let idx = *label_index.entry(label.clone()).or_insert_with(|| {
            labels.push(label);
            labels.len() - 1
        });
        observations.entry((idx, year, month)).or_insert(value);
    }

    let matches = match_concept_rows(&labels);
    debug!(
        rows = table.height(),
        discarded,
        observations = observations.len(),
        labels = labels.len(),
        "long-format pivot"
    );

    let mut periods: BTreeMap<i32, BTreeSet<Month>> = BTreeMap::new();
    for &(idx, year, month) in observations.keys() {
        if matches.contains(&Some(idx)) {
            periods.entry(year).or_default().insert(month);
        }
    }
    let candidates = periods
        .into_iter()
        .map(|(year, months)| YearBlock::new(year, months.into_iter().collect()));

    CanonicalGrid::from_fn(candidates, |concept: Concept, year, month| {
        let idx = matches[concept.index()]?;
        observations.get(&(idx, year, month)).copied()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use crate::schema::detect_long_schema;

    fn long_table(rows: &[(&str, &str, &str, &str)]) -> RawTable {
        RawTable::with_labels(
            &["Anno", "Mes", "Concepto", "Valor"],
            rows.iter()
                .map(|(a, m, c, v)| vec![Cell::from(*a), Cell::from(*m), Cell::from(*c), Cell::from(*v)])
                .collect(),
        )
    }

    fn build(rows: &[(&str, &str, &str, &str)]) -> CanonicalGrid {
        let t = long_table(rows);
        let schema = detect_long_schema(&t).unwrap();
        reconcile(&t, &schema)
    }

    #[test]
    fn first_duplicate_wins() {
        let g = build(&[("2023", "Ene", "TGP", "77,9"), ("2023", "Ene", "TGP", "88")]);
        assert_eq!(g.value(Concept::GlobalParticipation, 2023, Month::Jan), Some(77.9));
    }

    #[test]
    fn blocks_are_sorted_and_sparse() {
        let g = build(&[
            ("2024", "Mar", "Tasa de ocupación", "55"),
            ("2023", "Dic", "Tasa de ocupación", "54"),
            ("2023", "Feb", "TGP", "63"),
        ]);
        let years: Vec<i32> = g.year_blocks().iter().map(|b| b.year()).collect();
        assert_eq!(years, vec![2023, 2024]);
        assert_eq!(g.year_blocks()[0].months(), &[Month::Feb, Month::Dec]);
        assert_eq!(g.year_blocks()[1].months(), &[Month::Mar]);
        assert_eq!(g.value(Concept::Occupation, 2023, Month::Feb), None);
    }

    #[test]
    fn bad_rows_are_discarded() {
        let g = build(&[
            ("2023", "13", "TGP", "1"),
            ("total", "Ene", "TGP", "2"),
            ("2023", "Feb", "", "3"),
            ("2023", "Mar", "TGP", "n.d."),
            ("2023", "Abr", "TGP", "4"),
        ]);
        assert_eq!(g.year_blocks().len(), 1);
        assert_eq!(g.year_blocks()[0].months(), &[Month::Apr]);
    }

    #[test]
    fn unmatched_concepts_do_not_create_columns() {
        let g = build(&[("2023", "Ene", "Desocupados", "10"), ("2023", "Feb", "TGP", "60")]);
        assert_eq!(g.year_blocks()[0].months(), &[Month::Feb]);
        assert!(g.row(Concept::WorkingAgePopulation).values().iter().all(Option::is_none));
    }
}
