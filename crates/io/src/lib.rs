// Spreadsheet parsing and persistence for employee imports

pub mod cells;
pub mod csv;
pub mod sqlite;
pub mod xlsx;

use std::path::Path;

use hhrr_recon::config::SheetLayout;
use hhrr_recon::SpreadsheetParser;

pub use crate::csv::CsvParser;
pub use crate::sqlite::{SqliteStore, DEFAULT_DEPARTMENTS};
pub use crate::xlsx::XlsxParser;

/// Pick a parser from the file extension: `.csv`, `.tsv` and `.txt` are
/// delimited text, anything else goes through the workbook reader.
pub fn parser_for_path(path: &Path, layout: SheetLayout) -> Box<dyn SpreadsheetParser> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" => Box::new(CsvParser::new(layout)),
        "tsv" => Box::new(CsvParser::new(layout).with_delimiter(b'\t')),
        _ => Box::new(XlsxParser::new(layout)),
    }
}
