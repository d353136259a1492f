// Property-based tests for canonical grid construction.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashMap;

use proptest::prelude::*;
use laborgrid_recon::engine::{run, Layout};
use laborgrid_recon::render::{display, export_plan, format_value, WriteOp};
use laborgrid_recon::{Cell, Concept, GridConfig, Month, RawTable, SourceReading};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

const LABELS: [&str; 5] = [
    "% población en edad de trabajar",
    "TGP",
    "Tasa de ocupación (TO)",
    "Desocupados",
    "",
];

/// One long-format observation: (year, month, label index, value text).
fn arb_row() -> impl Strategy<Value = (i32, u32, usize, String)> {
    (
        2018i32..2026,
        0u32..15,
        0usize..LABELS.len(),
        prop_oneof![
            4 => (0u32..10_000).prop_map(|n| format!("{},{:02}", n / 100, n % 100)),
            1 => Just("n.d.".to_string()),
            1 => Just(String::new()),
        ],
    )
}

fn to_table(rows: &[(i32, u32, usize, String)]) -> RawTable {
    RawTable::with_labels(
        &["anno", "mes", "concepto", "valor"],
        rows.iter()
            .map(|(y, m, l, v)| {
                vec![
                    Cell::from(*y as i64),
                    Cell::from(*m as i64),
                    Cell::from(LABELS[*l]),
                    Cell::from(v.as_str()),
                ]
            })
            .collect(),
    )
}

/// Expected value per (concept, year, month): first parseable row wins.
fn first_values(rows: &[(i32, u32, usize, String)]) -> HashMap<(usize, i32, u32), f64> {
    let mut out = HashMap::new();
    for (y, m, l, v) in rows {
        let concept = match *l {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => continue,
        };
        if !(1..=12).contains(m) {
            continue;
        }
        let Ok(value) = v.replace(',', ".").parse::<f64>() else {
            continue;
        };
        out.entry((concept, *y, *m)).or_insert(value);
    }
    out
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn always_three_rows_in_order(rows in prop::collection::vec(arb_row(), 0..40)) {
        let result = run(&GridConfig::default(), &SourceReading::from_table(to_table(&rows)));
        let concepts: Vec<Concept> = result.grid.rows().iter().map(|r| r.concept()).collect();
        prop_assert_eq!(concepts, Concept::ALL.to_vec());
        for row in result.grid.rows() {
            prop_assert_eq!(row.values().len(), result.grid.column_count());
        }
    }

    #[test]
    fn years_and_months_strictly_ascending(rows in prop::collection::vec(arb_row(), 0..40)) {
        let result = run(&GridConfig::default(), &SourceReading::from_table(to_table(&rows)));
        let blocks = result.grid.year_blocks();
        for pair in blocks.windows(2) {
            prop_assert!(pair[0].year() < pair[1].year());
        }
        for block in blocks {
            prop_assert!(!block.months().is_empty());
            for pair in block.months().windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn every_column_has_a_value(rows in prop::collection::vec(arb_row(), 0..40)) {
        let result = run(&GridConfig::default(), &SourceReading::from_table(to_table(&rows)));
        let grid = &result.grid;
        for (idx, _) in grid.columns().enumerate() {
            prop_assert!(grid.rows().iter().any(|r| r.values()[idx].is_some()));
        }
    }

    #[test]
    fn first_observation_wins(rows in prop::collection::vec(arb_row(), 1..40)) {
        let result = run(&GridConfig::default(), &SourceReading::from_table(to_table(&rows)));
        prop_assert_eq!(result.layout(), Layout::Long);

        let expected = first_values(&rows);
        for ((concept, year, month), value) in &expected {
            let Some(month) = Month::from_number(i64::from(*month)) else {
                continue;
            };
            prop_assert_eq!(result.grid.value(Concept::ALL[*concept], *year, month), Some(*value));
        }
        let present: usize = result
            .grid
            .rows()
            .iter()
            .map(|r| r.values().iter().filter(|v| v.is_some()).count())
            .sum();
        prop_assert_eq!(present, expected.len());
    }

    #[test]
    fn preview_and_plan_round_trip(rows in prop::collection::vec(arb_row(), 0..40)) {
        let result = run(&GridConfig::default(), &SourceReading::from_table(to_table(&rows)));
        let preview = display(&result.grid);
        for op in export_plan(&result.grid).ops {
            match op {
                WriteOp::Number { row, col, value, .. } => {
                    prop_assert_eq!(&preview.rows[row - 2].values[col - 1], &format_value(Some(value)));
                }
                WriteOp::Blank { row, col, .. } => {
                    prop_assert!(preview.rows[row - 2].values[col - 1].is_empty());
                }
                _ => {}
            }
        }
    }
}
