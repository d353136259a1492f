use serde::Serialize;

use crate::alias::{Field, IDENTIFIER_COLUMNS};
use crate::coerce::{coerce, ColumnKind};
use crate::config::GridConfig;
use crate::model::{Cell, RawTable};
use crate::normalize::normalize;
use crate::profile::Profile;

pub const RULE_REQUIRED: &str = "Obligatorio no nulo";
pub const RULE_NUMERIC: &str = "Numérica coercible";

/// Offending raw values quoted in a numeric finding.
const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    pub rule: String,
    pub column: String,
    pub detail: String,
}

/// Run the fixed rule set over the source table and its profile.
///
/// Identifier columns must have no nulls. In numeric columns, the non-null
/// raw values that fail to coerce must stay within `max_null_ratio` of the
/// non-null count. Cells already blank in the source never count.
pub fn validate(original: &RawTable, profile: &Profile, config: &GridConfig) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    let working = &profile.working.table;

    for (col, label) in original.columns().iter().enumerate() {
        let label = label.to_string();
        if !IDENTIFIER_COLUMNS.matches(Field::Identifier, &normalize(&label)) {
            continue;
        }
        let missing = working.column(col).filter(|c| c.is_null()).count();
        if missing > 0 {
            findings.push(ValidationFinding {
                rule: RULE_REQUIRED.to_string(),
                column: label,
                detail: format!("{missing} valores faltantes"),
            });
        }
    }

    for (col, report) in profile.reports.iter().enumerate() {
        if report.kind != ColumnKind::Numeric {
            continue;
        }
        let offending: Vec<&Cell> = original
            .column(col)
            .filter(|c| !c.is_null() && coerce(c).is_none())
            .collect();
        let allowed = config.max_null_ratio * report.non_null as f64;
        if offending.is_empty() || (offending.len() as f64) <= allowed {
            continue;
        }
        let examples: Vec<String> = offending
            .iter()
            .take(MAX_EXAMPLES)
            .map(|c| format!("'{}'", c.to_label()))
            .collect();
        findings.push(ValidationFinding {
            rule: RULE_NUMERIC.to_string(),
            column: report.label.clone(),
            detail: format!(
                "{} valores nulos tras coerción. Ejemplos: [{}]",
                offending.len(),
                examples.join(", ")
            ),
        });
    }

    findings
}
