use std::path::{Path, PathBuf};

use laborgrid_recon::SourceReading;
use thiserror::Error;
use tracing::debug;

/// Uploads larger than this are refused before any parsing.
pub const MAX_INPUT_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file type '{0}' (expected .xlsx, .xlsm, .xls, .ods, .csv, .tsv or .txt)")]
    UnsupportedFormat(String),
    #[error("{} is {size} bytes, over the {limit}-byte limit", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook contains no sheets")]
    NoSheets,
    #[error("failed to parse delimited text: {0}")]
    Csv(#[from] ::csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Delimited,
}

/// Pick a reader from the file extension (case-insensitive).
pub fn detect_format(path: &Path) -> Result<SourceFormat, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Workbook),
        "csv" | "tsv" | "txt" => Ok(SourceFormat::Delimited),
        _ => Err(IngestError::UnsupportedFormat(ext)),
    }
}

/// Read one source file into the core's input shape.
pub fn read_source(path: &Path) -> Result<SourceReading, IngestError> {
    let format = detect_format(path)?;
    let size = std::fs::metadata(path)
        .map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > MAX_INPUT_BYTES {
        return Err(IngestError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_INPUT_BYTES,
        });
    }

    debug!(path = %path.display(), size, ?format, "reading source");
    match format {
        SourceFormat::Workbook => crate::xlsx::read(path),
        SourceFormat::Delimited => crate::csv::read(path),
    }
}
