use serde::Serialize;

use crate::model::Cell;

/// Share of non-null values that must convert for a column to count as numeric.
pub const NUMERIC_THRESHOLD: f64 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    NonNumeric,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numérica"),
            Self::NonNumeric => write!(f, "no numérica"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub kind: ColumnKind,
    pub non_null: usize,
    pub convertible: usize,
    /// `convertible / non_null`, or 0 when the column has no values.
    pub convertible_ratio: f64,
}

/// Strip NBSP, `%` and spaces, and turn decimal commas into points.
pub fn clean_numeric_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\u{00A0}' | '%' | ' '))
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Coerce free text. `None` on empty input, parse failure, or a non-finite result.
pub fn coerce_str(raw: &str) -> Option<f64> {
    let cleaned = clean_numeric_text(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce a raw cell to a number, or the absence marker.
pub fn coerce(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => Some(*n).filter(|n| n.is_finite()),
        Cell::Text(s) => coerce_str(s),
    }
}

/// Classify a column with the default threshold.
pub fn classify<'a>(values: impl IntoIterator<Item = &'a Cell>) -> Classification {
    classify_with_threshold(values, NUMERIC_THRESHOLD)
}

pub fn classify_with_threshold<'a>(
    values: impl IntoIterator<Item = &'a Cell>,
    threshold: f64,
) -> Classification {
    let mut non_null = 0usize;
    let mut convertible = 0usize;

    for cell in values {
        if cell.is_null() {
            continue;
        }
        non_null += 1;
        if coerce(cell).is_some() {
            convertible += 1;
        }
    }

    let convertible_ratio = if non_null == 0 {
        0.0
    } else {
        convertible as f64 / non_null as f64
    };

    let kind = if non_null > 0 && convertible_ratio >= threshold {
        ColumnKind::Numeric
    } else {
        ColumnKind::NonNumeric
    };

    Classification {
        kind,
        non_null,
        convertible,
        convertible_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    #[test]
    fn cleans_locale_noise() {
        assert_eq!(coerce_str("77,9"), Some(77.9));
        assert_eq!(coerce_str("12 %"), Some(12.0));
        assert_eq!(coerce_str("1\u{00A0}234"), Some(1234.0));
        assert_eq!(coerce_str(" 88 "), Some(88.0));
    }

    #[test]
    fn rejects_garbage_and_non_finite() {
        assert_eq!(coerce_str("n.d."), None);
        assert_eq!(coerce_str("1.234,5"), None);
        assert_eq!(coerce_str("inf"), None);
        assert_eq!(coerce_str("NaN"), None);
        assert_eq!(coerce_str(""), None);
        assert_eq!(coerce(&Cell::Number(f64::INFINITY)), None);
        assert_eq!(coerce(&Cell::Empty), None);
    }

    #[test]
    fn exactly_seventy_percent_is_numeric() {
        let col = cells(&["1", "2", "3", "4", "5", "6", "7", "x", "y", "z"]);
        let c = classify(&col);
        assert_eq!(c.kind, ColumnKind::Numeric);
        assert_eq!(c.convertible, 7);
        assert_eq!(c.non_null, 10);
    }

    #[test]
    fn just_below_seventy_percent_is_not() {
        let mut col: Vec<Cell> = (0..6999).map(|i| Cell::from(i as i64)).collect();
        col.extend((0..3001).map(|_| Cell::from("n/a")));
        let c = classify(&col);
        assert!(c.convertible_ratio < NUMERIC_THRESHOLD);
        assert_eq!(c.kind, ColumnKind::NonNumeric);
    }

    #[test]
    fn nulls_do_not_count() {
        let col = vec![Cell::Empty, Cell::from(" "), Cell::from("3")];
        let c = classify(&col);
        assert_eq!(c.non_null, 1);
        assert_eq!(c.convertible_ratio, 1.0);
    }

    #[test]
    fn empty_column_has_zero_ratio() {
        let col: Vec<Cell> = vec![Cell::Empty, Cell::Empty];
        let c = classify(&col);
        assert_eq!(c.convertible_ratio, 0.0);
        assert_eq!(c.kind, ColumnKind::NonNumeric);
    }
}
