// Annex commands: build, inspect, config-check

use std::path::{Path, PathBuf};

use laborgrid_io::{read_source, save_annex};
use laborgrid_recon::profile::ColumnReport;
use laborgrid_recon::render::DisplayGrid;
use laborgrid_recon::validate::ValidationFinding;
use laborgrid_recon::{run, AnnexResult, GridConfig, Layout};
use serde::Serialize;
use tracing::info;

use crate::exit_codes::EXIT_SKELETON;
use crate::CliError;

/// Machine-readable view of one run.
#[derive(Serialize)]
struct AnnexReport<'a> {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    meta: &'a laborgrid_recon::engine::AnnexMeta,
    columns: &'a [ColumnReport],
    findings: &'a [ValidationFinding],
    grid: DisplayGrid,
}

impl<'a> AnnexReport<'a> {
    fn new(input: &Path, output: Option<&Path>, result: &'a AnnexResult) -> Self {
        Self {
            input: input.display().to_string(),
            output: output.map(|p| p.display().to_string()),
            meta: &result.meta,
            columns: &result.columns,
            findings: &result.findings,
            grid: result.display(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<GridConfig, CliError> {
    let Some(path) = path else {
        return Ok(GridConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::args(format!("cannot read config {}: {}", path.display(), e))
    })?;
    Ok(GridConfig::from_toml(&text)?)
}

fn analyze(input: &Path, config: &GridConfig) -> Result<AnnexResult, CliError> {
    let reading = read_source(input)?;
    Ok(run(config, &reading))
}

fn print_json(report: &AnnexReport<'_>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| CliError::general(format!("JSON serialization failed: {}", e)))?;
    println!("{}", json);
    Ok(())
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

pub fn cmd_build(
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    json: bool,
    strict: bool,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let result = analyze(&input, &config)?;

    if strict && (result.layout() == Layout::Skeleton || result.grid.column_count() == 0) {
        return Err(CliError::new(
            EXIT_SKELETON,
            format!("{}: no (year, month) periods recognized", input.display()),
        )
        .with_hint("long sources need year, month, concept and value columns; matrix sheets need a 'Concepto' header"));
    }

    save_annex(&result, &output)?;
    info!(output = %output.display(), layout = %result.layout(), "annex written");

    eprintln!("{}", summary_line(&result));
    eprintln!("wrote {}", output.display());

    if json {
        print_json(&AnnexReport::new(&input, Some(&output), &result))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

pub fn cmd_inspect(input: PathBuf, config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let result = analyze(&input, &config)?;

    if json {
        return print_json(&AnnexReport::new(&input, None, &result));
    }

    println!("{}", summary_line(&result));
    println!();
    print!("{}", format_columns(&result.columns));
    println!();
    print!("{}", format_findings(&result.findings));
    println!();
    print!("{}", format_preview(&result.display()));
    Ok(())
}

// ---------------------------------------------------------------------------
// config-check
// ---------------------------------------------------------------------------

pub fn cmd_config_check(path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&path))?;
    eprintln!(
        "{}: ok (numeric_threshold={}, max_null_ratio={}, header_scan_rows={})",
        path.display(),
        config.numeric_threshold,
        config.max_null_ratio,
        config.header_scan_rows
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn summary_line(result: &AnnexResult) -> String {
    let periods: usize = result.grid.column_count();
    format!(
        "layout: {} | {} years, {} periods | {} findings",
        result.layout(),
        result.grid.year_blocks().len(),
        periods,
        result.findings.len()
    )
}

fn format_columns(columns: &[ColumnReport]) -> String {
    let mut out = format!(
        "{:<28} {:<12} {:>8} {:>8} {:>8}\n",
        "COLUMN", "KIND", "NONNULL", "CONV%", "NULLS"
    );
    for c in columns {
        out.push_str(&format!(
            "{:<28} {:<12} {:>8} {:>8.2} {:>8}\n",
            truncate(&c.label, 28),
            c.kind.to_string(),
            c.non_null,
            c.convertible_pct,
            c.nulls_after_coercion
        ));
    }
    out
}

fn format_findings(findings: &[ValidationFinding]) -> String {
    if findings.is_empty() {
        return "no findings\n".to_string();
    }
    findings
        .iter()
        .map(|f| format!("[{}] {}: {}\n", f.rule, f.column, f.detail))
        .collect()
}

/// Fixed-width preview: one header line per level, then one line per concept.
fn format_preview(grid: &DisplayGrid) -> String {
    let mut years = format!("{:<42}", "");
    let mut months = format!("{:<42}", "Concepto");
    for block in &grid.year_blocks {
        for (i, month) in block.months.iter().enumerate() {
            let year = if i == 0 { block.year.to_string() } else { String::new() };
            years.push_str(&format!(" {:>8}", year));
            months.push_str(&format!(" {:>8}", month));
        }
    }

    let mut out = format!("{}\n{}\n", years.trim_end(), months);
    for row in &grid.rows {
        let mut line = format!("{:<42}", truncate(&row.concept, 42));
        for value in &row.values {
            line.push_str(&format!(" {:>8}", value));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
