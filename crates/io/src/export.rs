// Annex workbook export (xlsx)

use std::path::{Path, PathBuf};

use laborgrid_recon::profile::{ColumnReport, WorkingTable};
use laborgrid_recon::render::{Borders, CellStyle, ExportPlan, HAlign, WriteOp};
use laborgrid_recon::validate::ValidationFinding;
use laborgrid_recon::{AnnexResult, Cell};
use rust_xlsxwriter::{Color, ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, Worksheet, XlsxError};
use thiserror::Error;
use tracing::debug;

pub const CLEAN_SHEET: &str = "Datos_Limpiados";
pub const FINDINGS_SHEET: &str = "Validaciones";
pub const REPORT_SHEET: &str = "Reporte_Columnas";

const FINDING_HEADERS: [&str; 3] = ["regla", "columna", "detalle"];
const REPORT_HEADERS: [&str; 5] = [
    "columna",
    "tipo_detectado",
    "no_nulos",
    "porc_convertible",
    "nulos_post_coerce",
];

const VALUE_WIDTH: f64 = 12.0;
const PERIOD_WIDTH: f64 = 10.0;
const DEFAULT_WIDTH: f64 = 18.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("position ({row}, {col}) is outside the worksheet")]
    OutOfRange { row: usize, col: usize },
}

/// Write the four-sheet annex workbook into memory.
pub fn write_annex(result: &AnnexResult) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    write_clean_data(workbook.add_worksheet().set_name(CLEAN_SHEET)?, &result.working)?;
    write_findings(workbook.add_worksheet().set_name(FINDINGS_SHEET)?, &result.findings)?;
    write_column_report(workbook.add_worksheet().set_name(REPORT_SHEET)?, &result.columns)?;
    let plan = result.export_plan();
    write_plan(workbook.add_worksheet().set_name(plan.sheet_name)?, &plan)?;

    let bytes = workbook.save_to_buffer()?;
    debug!(bytes = bytes.len(), layout = %result.layout(), "annex written");
    Ok(bytes)
}

/// Write the annex workbook to `path`.
pub fn save_annex(result: &AnnexResult, path: &Path) -> Result<(), ExportError> {
    let bytes = write_annex(result)?;
    std::fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn position(row: usize, col: usize) -> Result<(RowNum, ColNum), ExportError> {
    match (RowNum::try_from(row), ColNum::try_from(col)) {
        (Ok(r), Ok(c)) => Ok((r, c)),
        _ => Err(ExportError::OutOfRange { row, col }),
    }
}

fn write_header(worksheet: &mut Worksheet, labels: &[&str]) -> Result<(), ExportError> {
    let bold = Format::new().set_bold();
    for (col, label) in labels.iter().enumerate() {
        let (r, c) = position(0, col)?;
        worksheet.write_string_with_format(r, c, *label, &bold)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Datos_Limpiados
// ---------------------------------------------------------------------------

/// Two decimals on the value column, integers on year and month.
fn column_format(working: &WorkingTable, col: usize) -> Option<Format> {
    if Some(col) == working.value_column {
        Some(Format::new().set_num_format("0.00"))
    } else if Some(col) == working.year_column || Some(col) == working.month_column {
        Some(Format::new().set_num_format("0"))
    } else {
        None
    }
}

fn write_clean_data(worksheet: &mut Worksheet, working: &WorkingTable) -> Result<(), ExportError> {
    let labels: Vec<String> = working.table.columns().iter().map(|c| c.to_string()).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    write_header(worksheet, &label_refs)?;

    let formats: Vec<Option<Format>> = (0..working.table.width())
        .map(|col| column_format(working, col))
        .collect();

    for col in 0..working.table.width() {
        let (_, c) = position(0, col)?;
        let width = if Some(col) == working.value_column {
            VALUE_WIDTH
        } else if formats[col].is_some() {
            PERIOD_WIDTH
        } else {
            DEFAULT_WIDTH
        };
        worksheet.set_column_width(c, width)?;
    }

    for (i, row) in working.table.rows().iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            let (r, c) = position(i + 1, col)?;
            match (cell, formats.get(col).and_then(Option::as_ref)) {
                (Cell::Empty, _) => {}
                (Cell::Number(n), Some(format)) => {
                    worksheet.write_number_with_format(r, c, *n, format)?;
                }
                (Cell::Number(n), None) => {
                    worksheet.write_number(r, c, *n)?;
                }
                (Cell::Text(s), _) => {
                    worksheet.write_string(r, c, s)?;
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validaciones / Reporte_Columnas
// ---------------------------------------------------------------------------

fn write_findings(worksheet: &mut Worksheet, findings: &[ValidationFinding]) -> Result<(), ExportError> {
    write_header(worksheet, &FINDING_HEADERS)?;
    for (i, finding) in findings.iter().enumerate() {
        let (r, _) = position(i + 1, 0)?;
        worksheet.write_string(r, 0, &finding.rule)?;
        worksheet.write_string(r, 1, &finding.column)?;
        worksheet.write_string(r, 2, &finding.detail)?;
    }
    for col in 0..FINDING_HEADERS.len() as ColNum {
        worksheet.set_column_width(col, DEFAULT_WIDTH)?;
    }
    Ok(())
}

fn write_column_report(worksheet: &mut Worksheet, reports: &[ColumnReport]) -> Result<(), ExportError> {
    write_header(worksheet, &REPORT_HEADERS)?;
    for (i, report) in reports.iter().enumerate() {
        let (r, _) = position(i + 1, 0)?;
        worksheet.write_string(r, 0, &report.label)?;
        worksheet.write_string(r, 1, report.kind.to_string())?;
        worksheet.write_number(r, 2, report.non_null as f64)?;
        worksheet.write_number(r, 3, report.convertible_pct)?;
        worksheet.write_number(r, 4, report.nulls_after_coercion as f64)?;
    }
    for col in 0..REPORT_HEADERS.len() as ColNum {
        worksheet.set_column_width(col, DEFAULT_WIDTH)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Datos_Deseados
// ---------------------------------------------------------------------------

fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new()
        .set_background_color(Color::RGB(style.fill))
        .set_align(match style.align {
            HAlign::Left => FormatAlign::Left,
            HAlign::Center => FormatAlign::Center,
            HAlign::Right => FormatAlign::Right,
        })
        .set_align(FormatAlign::VerticalCenter);

    if style.bold {
        format = format.set_bold();
    }
    if let Some(num_format) = style.num_format {
        format = format.set_num_format(num_format);
    }
    apply_borders(format, &style.borders, Color::RGB(style.border_color))
}

fn apply_borders(mut format: Format, borders: &Borders, color: Color) -> Format {
    if !borders.any() {
        return format;
    }
    if borders.top {
        format = format.set_border_top(FormatBorder::Thin).set_border_top_color(color);
    }
    if borders.bottom {
        format = format.set_border_bottom(FormatBorder::Thin).set_border_bottom_color(color);
    }
    if borders.left {
        format = format.set_border_left(FormatBorder::Thin).set_border_left_color(color);
    }
    if borders.right {
        format = format.set_border_right(FormatBorder::Thin).set_border_right_color(color);
    }
    format
}

/// Execute the plan verbatim; no layout decisions are made here.
pub fn write_plan(worksheet: &mut Worksheet, plan: &ExportPlan) -> Result<(), ExportError> {
    worksheet.set_screen_gridlines(!plan.hide_gridlines);

    for width in &plan.column_widths {
        let (_, c) = position(0, width.col)?;
        worksheet.set_column_width(c, width.width)?;
    }

    for op in &plan.ops {
        match op {
            WriteOp::Merge {
                first_row,
                first_col,
                last_row,
                last_col,
                text,
                style,
            } => {
                let (r1, c1) = position(*first_row, *first_col)?;
                let (r2, c2) = position(*last_row, *last_col)?;
                worksheet.merge_range(r1, c1, r2, c2, text, &build_format(style))?;
            }
            WriteOp::Text { row, col, text, style } => {
                let (r, c) = position(*row, *col)?;
                worksheet.write_string_with_format(r, c, text, &build_format(style))?;
            }
            WriteOp::Number { row, col, value, style } => {
                let (r, c) = position(*row, *col)?;
                worksheet.write_number_with_format(r, c, *value, &build_format(style))?;
            }
            WriteOp::Blank { row, col, style } => {
                let (r, c) = position(*row, *col)?;
                worksheet.write_blank(r, c, &build_format(style))?;
            }
        }
    }
    Ok(())
}
