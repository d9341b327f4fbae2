// CSV/TSV employee sheets

use chrono::{NaiveDate, Utc};
use tracing::debug;

use hhrr_recon::config::SheetLayout;
use hhrr_recon::{ParseError, RawImportRow, SpreadsheetParser};

use crate::cells::{Cell, RowMapper};

pub struct CsvParser {
    layout: SheetLayout,
    today: NaiveDate,
    delimiter: Option<u8>,
}

impl CsvParser {
    pub fn new(layout: SheetLayout) -> Self {
        Self {
            layout,
            today: Utc::now().date_naive(),
            delimiter: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Fix the delimiter instead of sniffing it.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

impl SpreadsheetParser for CsvParser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<RawImportRow>, ParseError> {
        let content = decode_utf8(bytes);
        let delimiter = self.delimiter.unwrap_or_else(|| {
            sniff_delimiter(&content, self.layout.header_rows, self.layout.columns.email)
        });

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mapper = RowMapper::new(&self.layout, self.today);
        let mut rows = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| ParseError::Csv {
                line: e.position().map(|p| p.line()).unwrap_or(row_idx as u64 + 1),
                message: e.to_string(),
            })?;
            if row_idx < self.layout.header_rows {
                continue;
            }
            let cells: Vec<Cell> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            // Source line, so quoted multi-line fields do not shift later rows.
            let line = record.position().map_or(row_idx + 1, |p| p.line() as usize);
            if let Some(row) = mapper.map_row(line, &cells) {
                rows.push(row);
            }
        }

        debug!(rows = rows.len(), delimiter = %(delimiter as char), "parsed CSV");
        Ok(rows)
    }
}

const CANDIDATE_DELIMITERS: [u8; 4] = [b'|', b'\t', b';', b','];

/// Pick the delimiter for an employee sheet from up to ten data lines below
/// the header. A candidate must split some line far enough to reach the email
/// column to beat one that does not; after that the most lines agreeing on the
/// widest split wins, then the widest split. Exact ties go to the later
/// candidate, so comma wins over semicolon, tab and pipe.
fn sniff_delimiter(content: &str, header_rows: usize, email_column: usize) -> u8 {
    let mut sample: Vec<&str> = content
        .lines()
        .skip(header_rows)
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();
    if sample.is_empty() {
        sample = content.lines().take(10).collect();
    }

    CANDIDATE_DELIMITERS
        .iter()
        .copied()
        .filter_map(|delim| {
            let widths: Vec<usize> = sample.iter().map(|line| field_count(line, delim)).collect();
            let widest = widths.iter().copied().max().unwrap_or(0);
            if widest <= 1 {
                return None;
            }
            let agreeing = widths.iter().filter(|&&w| w == widest).count();
            Some((delim, (widest >= email_column, agreeing, widest)))
        })
        .max_by_key(|&(_, score)| score)
        .map_or(b',', |(delim, _)| delim)
}

fn field_count(line: &str, delim: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// UTF-8 if valid, else Windows-1252 (common for Excel-exported CSVs).
fn decode_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.strip_prefix('\u{feff}').unwrap_or(s).to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hhrr_recon::config::ColumnLayout;
    use rust_decimal::Decimal;

    fn layout() -> SheetLayout {
        SheetLayout {
            columns: ColumnLayout {
                first_name: 1,
                last_name: 2,
                email: 3,
                job_title: 4,
                salary: 5,
                hiring_date: 6,
                status: 7,
                department: 8,
            },
            ..SheetLayout::default()
        }
    }

    fn parser() -> CsvParser {
        CsvParser::new(layout()).with_today(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    #[test]
    fn sniff_picks_consistent_delimiter() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n", 1, 3), b';');
        assert_eq!(sniff_delimiter("a,b\n1,2\n", 1, 3), b',');
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n", 1, 3), b'\t');
        assert_eq!(sniff_delimiter("", 1, 3), b',');
    }

    #[test]
    fn sniff_ignores_header_in_another_delimiter() {
        let data = "first,last,email\nAna;Pérez;ana@x.com\nLuis;Gómez;luis@x.com\n";
        assert_eq!(sniff_delimiter(data, 1, 3), b';');
    }

    #[test]
    fn sniff_prefers_split_reaching_email_column() {
        // Commas inside job titles split every line in two; only ';' reaches column 3.
        let data = "h\nAna;Pérez;ana@x.com;Sales, North\nLuis, Jr;Gómez\n";
        assert_eq!(sniff_delimiter(data, 1, 3), b';');
    }

    #[test]
    fn row_numbers_follow_source_lines_past_multiline_fields() {
        let data = "h1,h2,h3,h4,h5,h6,h7,h8\n\
                    Ana,\"Pérez\nde la Cruz\",ana@x.com,,,,,Sales\n\
                    Luis,Gómez,luis@x.com,,,,,Sales\n";
        let rows = parser().with_delimiter(b',').parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].name, "Ana Pérez\nde la Cruz");
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn parses_semicolon_file_with_decimal_comma() {
        let data = "\
nombre;apellido;email;cargo;salario;ingreso;estado;area
Ana;Pérez;ana@x.com;Analyst;2.500,50;14/03/2023;Activo;Sales
;;;;;;;
Luis;Gómez;;Driver;1.000;2022-01-01;Inactivo;Logístic
";
        let rows = parser().parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].salary, Decimal::new(250_050, 2));
        assert_eq!(rows[0].hiring_date, NaiveDate::from_ymd_opt(2023, 3, 14).unwrap());
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].email, "");
        assert_eq!(rows[1].salary, Decimal::new(1000, 0));
    }

    #[test]
    fn windows_1252_input_is_decoded() {
        // "Gómez" with ó as 0xF3
        let mut data = b"h1,h2,h3,h4,h5,h6,h7,h8\nLuis,G".to_vec();
        data.push(0xF3);
        data.extend_from_slice(b"mez,luis@x.com,,,,,Sales\n");
        let rows = parser().parse(&data).unwrap();
        assert_eq!(rows[0].name, "Luis Gómez");
    }

    #[test]
    fn bom_is_stripped() {
        let data = "\u{feff}h1,h2,h3,h4,h5,h6,h7,h8\nAna,,ana@x.com,,,,,Sales\n";
        let rows = parser().parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "ana@x.com");
    }

    #[test]
    fn fixed_delimiter_overrides_sniffing() {
        let data = "h1|h2|h3|h4|h5|h6|h7|h8\nAna|B|ana@x.com|||||Sales\n";
        let rows = parser().with_delimiter(b'|').parse(data.as_bytes()).unwrap();
        assert_eq!(rows[0].department_name, "Sales");
    }
}
