use std::collections::BTreeMap;

use serde::Serialize;

use crate::calendar::Month;

// ---------------------------------------------------------------------------
// Concepts
// ---------------------------------------------------------------------------

/// The three labor-market indicators, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    WorkingAgePopulation,
    GlobalParticipation,
    Occupation,
}

impl Concept {
    pub const ALL: [Concept; 3] = [
        Self::WorkingAgePopulation,
        Self::GlobalParticipation,
        Self::Occupation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::WorkingAgePopulation => "% población en edad de trabajar",
            Self::GlobalParticipation => "Tasa Global de Participación (TGP)",
            Self::Occupation => "Tasa de Ocupación (TO)",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Concept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Year blocks
// ---------------------------------------------------------------------------

/// Months present for one year, calendar order, no repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearBlock {
    year: i32,
    months: Vec<Month>,
}

impl YearBlock {
    pub fn new(year: i32, mut months: Vec<Month>) -> Self {
        months.sort();
        months.dedup();
        Self { year, months }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptRow {
    concept: Concept,
    values: Vec<Option<f64>>,
}

impl ConceptRow {
    pub fn concept(&self) -> Concept {
        self.concept
    }

    /// One entry per grid column; `None` is "no value".
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// Concept × (year, month) table. Immutable once built.
///
/// Invariants held by construction:
/// - exactly one row per [`Concept`], in [`Concept::ALL`] order;
/// - year blocks ascending, months in calendar order;
/// - every emitted (year, month) column has at least one value;
/// - values are finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalGrid {
    year_blocks: Vec<YearBlock>,
    rows: Vec<ConceptRow>,
}

impl CanonicalGrid {
    /// Concept rows only, no year blocks.
    pub fn skeleton() -> Self {
        Self {
            year_blocks: Vec::new(),
            rows: Concept::ALL
                .into_iter()
                .map(|concept| ConceptRow {
                    concept,
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    /// Build a grid from candidate year blocks and a cell lookup.
    ///
    /// Candidate blocks may arrive unsorted or repeat a year; they are merged.
    /// Columns where every concept is absent are dropped, then empty years.
    pub fn from_fn(
        candidates: impl IntoIterator<Item = YearBlock>,
        mut lookup: impl FnMut(Concept, i32, Month) -> Option<f64>,
    ) -> Self {
        let mut by_year: BTreeMap<i32, Vec<Month>> = BTreeMap::new();
        for block in candidates {
            by_year.entry(block.year).or_default().extend(block.months);
        }

        let mut year_blocks = Vec::new();
        let mut columns: Vec<[Option<f64>; 3]> = Vec::new();

        for (year, months) in by_year {
            let block = YearBlock::new(year, months);
            let mut kept = Vec::new();
            for &month in block.months() {
                let cells = Concept::ALL.map(|c| lookup(c, year, month).filter(|v| v.is_finite()));
                if cells.iter().any(Option::is_some) {
                    kept.push(month);
                    columns.push(cells);
                }
            }
            if !kept.is_empty() {
                year_blocks.push(YearBlock::new(year, kept));
            }
        }

        let rows = Concept::ALL
            .into_iter()
            .map(|concept| ConceptRow {
                concept,
                values: columns.iter().map(|cells| cells[concept.index()]).collect(),
            })
            .collect();

        Self { year_blocks, rows }
    }

    pub fn year_blocks(&self) -> &[YearBlock] {
        &self.year_blocks
    }

    pub fn rows(&self) -> &[ConceptRow] {
        &self.rows
    }

    pub fn row(&self, concept: Concept) -> &ConceptRow {
        &self.rows[concept.index()]
    }

    /// Flattened (year, month) column order.
    pub fn columns(&self) -> impl Iterator<Item = (i32, Month)> + '_ {
        self.year_blocks
            .iter()
            .flat_map(|b| b.months.iter().map(move |m| (b.year, *m)))
    }

    pub fn column_count(&self) -> usize {
        self.year_blocks.iter().map(|b| b.months.len()).sum()
    }

    pub fn value(&self, concept: Concept, year: i32, month: Month) -> Option<f64> {
        let idx = self.columns().position(|(y, m)| y == year && m == month)?;
        self.row(concept).values.get(idx).copied().flatten()
    }

    pub fn is_skeleton(&self) -> bool {
        self.year_blocks.is_empty()
    }
}
