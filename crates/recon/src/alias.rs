//! Declarative alias tables and the one matcher that consumes them.
//!
//! Every fuzzy lookup in the crate (schema columns, identifier columns,
//! concept rows) is a table of `key -> [alias]` plus a match mode. Labels
//! and aliases are both run through [`normalize`] before comparison.

use crate::grid::Concept;
use crate::normalize::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Normalized label equals a normalized alias.
    Exact,
    /// Normalized label contains a normalized alias.
    Contains,
}

#[derive(Debug)]
pub struct AliasTable<K: 'static> {
    mode: MatchMode,
    entries: &'static [(K, &'static [&'static str])],
}

impl<K: Copy + PartialEq> AliasTable<K> {
    pub const fn new(mode: MatchMode, entries: &'static [(K, &'static [&'static str])]) -> Self {
        Self { mode, entries }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn aliases(&self, key: K) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    /// Does an already-normalized label match `key`? Empty labels never match.
    pub fn matches(&self, key: K, normalized_label: &str) -> bool {
        if normalized_label.is_empty() {
            return false;
        }
        self.aliases(key).iter().any(|alias| {
            let alias = normalize(alias);
            match self.mode {
                MatchMode::Exact => normalized_label == alias,
                MatchMode::Contains => normalized_label.contains(&alias),
            }
        })
    }

    /// Index of the first label (in order) matching `key`.
    pub fn find<I, S>(&self, key: K, labels: I) -> Option<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .position(|label| self.matches(key, &normalize(label.as_ref())))
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Column roles recognized by the schema detector and the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Month,
    Concept,
    Value,
    Identifier,
}

const YEAR: &[&str] = &["anno", "año", "ano", "anio", "year"];
const MONTH: &[&str] = &["mes", "month", "mes_num", "nmes"];
const CONCEPT: &[&str] = &[
    "concepto",
    "indicador",
    "variable",
    "serie",
    "poblacion en ed trabajar",
    "poblacion en edad de trabajar",
];
const VALUE: &[&str] = &["tasa global de participacion", "tgp", "valor", "dato", "medida"];
const IDENTIFIER: &[&str] = &[
    "id",
    "codigo",
    "cod_mpio",
    "cod_departamento",
    "departamento",
    "municipio",
];

/// Year/month columns: whole-label match.
pub static PERIOD_COLUMNS: AliasTable<Field> =
    AliasTable::new(MatchMode::Exact, &[(Field::Year, YEAR), (Field::Month, MONTH)]);

/// Concept/value columns: substring match.
pub static SERIES_COLUMNS: AliasTable<Field> =
    AliasTable::new(MatchMode::Contains, &[(Field::Concept, CONCEPT), (Field::Value, VALUE)]);

/// Columns that must never be null.
pub static IDENTIFIER_COLUMNS: AliasTable<Field> =
    AliasTable::new(MatchMode::Exact, &[(Field::Identifier, IDENTIFIER)]);

const WORKING_AGE: &[&str] = &[
    "poblacion en edad de trabajar",
    "poblacion en ed trabajar",
    "edad de trabajar",
];
const PARTICIPATION: &[&str] = &["tasa global de participacion", "tgp", "participacion"];
const OCCUPATION: &[&str] = &["tasa de ocupacion", "to", "ocupacion"];

/// Source row labels for each canonical concept.
pub static CONCEPT_ROWS: AliasTable<Concept> = AliasTable::new(
    MatchMode::Contains,
    &[
        (Concept::WorkingAgePopulation, WORKING_AGE),
        (Concept::GlobalParticipation, PARTICIPATION),
        (Concept::Occupation, OCCUPATION),
    ],
);
