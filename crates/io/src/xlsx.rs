// Excel/ODS ingestion

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use laborgrid_recon::{Cell, SheetGrid, SourceReading};
use tracing::debug;

use crate::ingest::IngestError;

/// Sheet read in preference to the first one.
pub const PREFERRED_SHEET: &str = "base";

/// Read the preferred sheet of a workbook (xlsx, xlsm, xls, ods).
pub fn read(path: &Path) -> Result<SourceReading, IngestError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = pick_sheet(&sheet_names).ok_or(IngestError::NoSheets)?.to_string();

    let range = workbook.worksheet_range(&sheet_name)?;
    let grid = grid_from_range(&range);
    debug!(sheet = %sheet_name, rows = grid.height(), cols = grid.width(), "workbook sheet loaded");
    Ok(SourceReading::from_grid(grid))
}

/// "Base" (ignoring case and spaces) if present, else the first sheet.
pub fn pick_sheet(names: &[String]) -> Option<&str> {
    names
        .iter()
        .find(|n| n.trim().to_lowercase() == PREFERRED_SHEET)
        .or_else(|| names.first())
        .map(String::as_str)
}

/// Lay the range out at its absolute sheet position so row indices match
/// the sheet (data may not begin at A1).
fn grid_from_range(range: &Range<Data>) -> SheetGrid {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }
    SheetGrid::new(rows)
}

pub fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Serial number; the core only ever reads years and months as plain numbers
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefers_base_sheet() {
        assert_eq!(pick_sheet(&names(&["Resumen", " BASE ", "Otra"])), Some(" BASE "));
        assert_eq!(pick_sheet(&names(&["Resumen", "Otra"])), Some("Resumen"));
        assert_eq!(pick_sheet(&[]), None);
    }

    #[test]
    fn maps_calamine_values() {
        assert_eq!(to_cell(&Data::Int(2023)), Cell::Number(2023.0));
        assert_eq!(to_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(to_cell(&Data::String("Ene".into())), Cell::from("Ene"));
        assert_eq!(to_cell(&Data::Bool(true)), Cell::from("TRUE"));
    }

    #[test]
    fn reads_base_sheet_at_absolute_offset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anexo.xlsx");

        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .set_name("Portada")
            .unwrap()
            .write_string(0, 0, "ignorar")
            .unwrap();
        let base = workbook.add_worksheet().set_name("Base").unwrap();
        base.write_string(2, 1, "Concepto").unwrap();
        base.write_string(2, 2, "2023").unwrap();
        base.write_string(3, 2, "Ene").unwrap();
        base.write_string(4, 1, "TGP").unwrap();
        base.write_number(4, 2, 64.1).unwrap();
        workbook.save(&path).unwrap();

        let reading = read(&path).unwrap();
        let grid = reading.grid.unwrap();
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.row(2).unwrap()[1], Cell::from("Concepto"));
        assert_eq!(grid.row(4).unwrap()[2], Cell::Number(64.1));
    }
}
