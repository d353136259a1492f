use serde::Deserialize;

use crate::coerce::NUMERIC_THRESHOLD;
use crate::error::GridError;
use crate::header::HEADER_SCAN_ROWS;

/// Largest share of post-coercion nulls a numeric column may carry,
/// relative to its original non-null count.
pub const MAX_NULL_RATIO: f64 = 0.30;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Tunable heuristics. Every field has a default; an empty file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Minimum convertible share for a column to be classified numeric.
    #[serde(default = "default_numeric_threshold")]
    pub numeric_threshold: f64,
    /// Post-coercion null tolerance for numeric columns.
    #[serde(default = "default_max_null_ratio")]
    pub max_null_ratio: f64,
    /// Rows scanned for the "Concepto" header in matrix sheets.
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
}

fn default_numeric_threshold() -> f64 {
    NUMERIC_THRESHOLD
}

fn default_max_null_ratio() -> f64 {
    MAX_NULL_RATIO
}

fn default_header_scan_rows() -> usize {
    HEADER_SCAN_ROWS
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            numeric_threshold: NUMERIC_THRESHOLD,
            max_null_ratio: MAX_NULL_RATIO,
            header_scan_rows: HEADER_SCAN_ROWS,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl GridConfig {
    pub fn from_toml(input: &str) -> Result<Self, GridError> {
        let config: GridConfig =
            toml::from_str(input).map_err(|e| GridError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if !(self.numeric_threshold > 0.0 && self.numeric_threshold <= 1.0) {
            return Err(GridError::ConfigValidation(format!(
                "numeric_threshold must be in (0, 1], got {}",
                self.numeric_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.max_null_ratio) {
            return Err(GridError::ConfigValidation(format!(
                "max_null_ratio must be in [0, 1], got {}",
                self.max_null_ratio
            )));
        }

        // Need room for both header levels
        if self.header_scan_rows < 2 {
            return Err(GridError::ConfigValidation(format!(
                "header_scan_rows must be at least 2, got {}",
                self.header_scan_rows
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = GridConfig::from_toml("").unwrap();
        assert_eq!(config, GridConfig::default());
        assert_eq!(config.numeric_threshold, 0.70);
        assert_eq!(config.max_null_ratio, 0.30);
        assert_eq!(config.header_scan_rows, 25);
    }

    #[test]
    fn parse_overrides() {
        let config = GridConfig::from_toml(
            r#"
numeric_threshold = 0.9
max_null_ratio = 0.1
header_scan_rows = 40
"#,
        )
        .unwrap();
        assert_eq!(config.numeric_threshold, 0.9);
        assert_eq!(config.max_null_ratio, 0.1);
        assert_eq!(config.header_scan_rows, 40);
    }

    #[test]
    fn reject_out_of_range_threshold() {
        let err = GridConfig::from_toml("numeric_threshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("numeric_threshold"));
        let err = GridConfig::from_toml("numeric_threshold = 0").unwrap_err();
        assert!(err.to_string().contains("numeric_threshold"));
    }

    #[test]
    fn reject_negative_null_ratio() {
        let err = GridConfig::from_toml("max_null_ratio = -0.1").unwrap_err();
        assert!(err.to_string().contains("max_null_ratio"));
    }

    #[test]
    fn reject_tiny_scan_window() {
        let err = GridConfig::from_toml("header_scan_rows = 1").unwrap_err();
        assert!(err.to_string().contains("header_scan_rows"));
    }

    #[test]
    fn reject_unknown_keys() {
        let err = GridConfig::from_toml("threshold = 0.5").unwrap_err();
        assert!(matches!(err, GridError::ConfigParse(_)));
    }
}
