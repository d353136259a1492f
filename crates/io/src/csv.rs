// CSV/TSV ingestion

use std::io::Read;
use std::path::Path;

use laborgrid_recon::{Cell, SheetGrid, SourceReading};
use tracing::debug;

use crate::ingest::IngestError;

pub fn read(path: &Path) -> Result<SourceReading, IngestError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    debug!(delimiter = ?(delimiter as char), "delimiter sniffed");
    Ok(SourceReading::from_grid(parse(&content, delimiter)?))
}

const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Lines sampled from the top of the file when sniffing.
const SNIFF_LINES: usize = 10;

/// Field count of each record in `sample` when split on `delimiter`.
fn record_widths(sample: &str, delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes())
        .records()
        .map(|record| record.map(|r| r.len()).unwrap_or(1))
        .collect()
}

/// Records agreeing with the first record's width, weighted by that width.
/// Zero when the first record does not split at all.
fn consistency(widths: &[usize]) -> usize {
    match widths.first() {
        Some(&width) if width > 1 => widths.iter().filter(|&&w| w == width).count() * width,
        _ => 0,
    }
}

/// Pick the field delimiter among tab, `;`, `,` and `|` that splits the first
/// lines most consistently. Ties go to the earlier candidate; `,` when
/// nothing splits.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample = match content.match_indices('\n').nth(SNIFF_LINES - 1) {
        Some((end, _)) => &content[..end],
        None => content,
    };

    let mut best: Option<(u8, usize)> = None;
    for delimiter in DELIMITERS {
        let score = consistency(&record_widths(sample, delimiter));
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((delimiter, score));
        }
    }
    best.map_or(b',', |(delimiter, _)| delimiter)
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IngestError> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text into a header-less grid; empty fields are empty cells.
pub fn parse(content: &str, delimiter: u8) -> Result<SheetGrid, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::from(field)
                    }
                })
                .collect(),
        );
    }
    Ok(SheetGrid::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Anno;Mes;Concepto;Valor\n2023;Ene;TGP;77,9\n2023;Feb;TGP;78,1\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "anno,mes,indicador,valor\n2023,1,TGP,77.9\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "anno\tmes\tvalor\n2023\tEne\t77,9\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_pipe_delimiter() {
        let content = "anno|mes|valor\n2023|Ene|1\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn test_sniff_semicolon_with_decimal_commas_in_quotes() {
        let content = "Concepto;Valor;Mes\n\"Tasa global, total\";\"77,9\";Ene\nTO;\"56,1\";Ene\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_defaults_to_comma_when_nothing_splits() {
        assert_eq!(sniff_delimiter(""), b',');
        assert_eq!(sniff_delimiter("solo\nuna\ncolumna\n"), b',');
    }

    #[test]
    fn test_sniff_quoted_field_spanning_lines() {
        let content = "Concepto;Nota\n\"Tasa global;\nrevisada\";x\nTO;y\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_consistency_scores_agreeing_records() {
        assert_eq!(consistency(&[3, 3, 2, 3]), 9);
        assert_eq!(consistency(&[1, 4, 4]), 0);
        assert_eq!(consistency(&[]), 0);
    }

    #[test]
    fn test_parse_keeps_empty_fields_as_empty_cells() {
        let grid = parse("a;b;c\n1;;3\n", b';').unwrap();
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.row(1).unwrap()[1], Cell::Empty);
        assert_eq!(grid.row(1).unwrap()[2], Cell::from("3"));
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Año;Valor" in Windows-1252
        fs::write(&path, b"A\xf1o;Valor\n2023;1\n").unwrap();

        let reading = read(&path).unwrap();
        assert_eq!(reading.table.columns()[0].to_string(), "Año");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{FEFF}anno;mes\n2023;Ene\n").unwrap();

        let reading = read(&path).unwrap();
        assert_eq!(reading.table.columns()[0].to_string(), "anno");
    }
}
