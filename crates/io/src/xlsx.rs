// Excel employee sheets (xlsx, xls, xlsb, ods) via calamine.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::{NaiveDate, Utc};
use tracing::debug;

use hhrr_recon::config::SheetLayout;
use hhrr_recon::{ParseError, RawImportRow, SpreadsheetParser};

use crate::cells::{Cell, RowMapper};

/// Default limit on data rows below the header (Excel's sheet height).
pub const MAX_ROWS: usize = 1_048_576;

pub struct XlsxParser {
    layout: SheetLayout,
    today: NaiveDate,
    max_rows: usize,
}

impl XlsxParser {
    pub fn new(layout: SheetLayout) -> Self {
        Self {
            layout,
            today: Utc::now().date_naive(),
            max_rows: MAX_ROWS,
        }
    }

    /// Date used for rows whose hiring date cannot be read.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Sheets with more data rows than this fail with `TooManyRows`
    /// instead of being cut short.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

impl SpreadsheetParser for XlsxParser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<RawImportRow>, ParseError> {
        let mut workbook: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| ParseError::Open(e.to_string()))?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let sheet_name = sheet_names
            .get(self.layout.worksheet)
            .cloned()
            .ok_or(ParseError::NoWorksheet {
                index: self.layout.worksheet,
                available: sheet_names.len(),
            })?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ParseError::Worksheet {
                sheet: sheet_name.clone(),
                message: e.to_string(),
            })?;

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let (start_row, start_col) = (start_row as usize, start_col as usize);

        let data_rows = range
            .height()
            .saturating_sub(self.layout.header_rows.saturating_sub(start_row));
        if data_rows > self.max_rows {
            return Err(ParseError::TooManyRows {
                sheet: sheet_name,
                rows: data_rows,
                max: self.max_rows,
            });
        }

        let mapper = RowMapper::new(&self.layout, self.today);
        let mut rows = Vec::new();

        for (row_idx, data_row) in range.rows().enumerate() {
            let sheet_row = start_row + row_idx;
            if sheet_row < self.layout.header_rows {
                continue;
            }

            // Left-pad so cells[i] is column i + 1 regardless of start_col.
            let mut cells = vec![Cell::Empty; start_col];
            cells.extend(data_row.iter().map(to_cell));

            if let Some(row) = mapper.map_row(sheet_row + 1, &cells) {
                rows.push(row);
            }
        }

        debug!(sheet = %sheet_name, rows = rows.len(), "parsed worksheet");
        Ok(rows)
    }
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Treat errors as blank; a #REF! email is no email.
        Data::Error(_) => Cell::Empty,
        Data::DateTime(dt) => Cell::DateSerial(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
