// Cell coercion shared by the XLSX and CSV parsers: grid rows in,
// RawImportRow out, using the configured column layout.

use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use hhrr_recon::config::SheetLayout;
use hhrr_recon::{EmployeeStatus, RawImportRow};

/// Decoded value of one spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Excel date serial (1900 date system).
    DateSerial(f64),
}

impl Cell {
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) | Self::DateSerial(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Turns grid rows into import rows. `today` stands in for unparseable dates.
pub struct RowMapper<'a> {
    layout: &'a SheetLayout,
    today: NaiveDate,
}

impl<'a> RowMapper<'a> {
    pub fn new(layout: &'a SheetLayout, today: NaiveDate) -> Self {
        Self { layout, today }
    }

    /// Map one grid row. `cells[i]` is column `i + 1`. Returns `None` when
    /// every mapped column is blank (trailing sheet padding).
    pub fn map_row(&self, row_number: usize, cells: &[Cell]) -> Option<RawImportRow> {
        let cols = &self.layout.columns;
        let get = |col: usize| cells.get(col - 1).unwrap_or(&Cell::Empty);

        let mapped = [
            cols.first_name,
            cols.last_name,
            cols.email,
            cols.job_title,
            cols.salary,
            cols.hiring_date,
            cols.status,
            cols.department,
        ];
        if mapped.iter().all(|&c| get(c).is_blank()) {
            return None;
        }

        let name = format!("{} {}", get(cols.first_name).text(), get(cols.last_name).text())
            .trim()
            .to_string();

        Some(RawImportRow {
            row_number,
            name,
            email: get(cols.email).text(),
            job_title: get(cols.job_title).text(),
            salary: parse_salary(get(cols.salary), self.layout.decimal_comma),
            hiring_date: parse_date(get(cols.hiring_date)).unwrap_or(self.today),
            department_name: get(cols.department).text(),
            status: parse_status(&get(cols.status).text()),
        })
    }
}

/// Salary from a cell. Text has currency symbols and spaces stripped; with
/// `decimal_comma` the text is read as `1.234,56`. Unparseable is zero.
pub fn parse_salary(cell: &Cell, decimal_comma: bool) -> Decimal {
    match cell {
        Cell::Number(n) => Decimal::try_from(*n).map(|d| d.round_dp(2)).unwrap_or(Decimal::ZERO),
        Cell::Text(s) => parse_salary_text(s, decimal_comma).unwrap_or(Decimal::ZERO),
        Cell::Empty | Cell::DateSerial(_) => Decimal::ZERO,
    }
}

fn parse_salary_text(s: &str, decimal_comma: bool) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | ' ' | '\u{a0}'))
        .collect();
    let normalized = if decimal_comma {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.replace(',', "")
    };
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

const TEXT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateSerial(serial) => date_from_serial(*serial),
        Cell::Text(s) => parse_date_text(s.trim()),
        Cell::Number(_) | Cell::Empty => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    for fmt in TEXT_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Excel serial → date, counting from 1899-12-30 to absorb Excel's phantom
/// 1900-02-29. Exact from serial 61 (1900-03-01) onward.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

/// Spanish and English spellings; vacation counts as active.
pub fn parse_status(s: &str) -> EmployeeStatus {
    match s.trim().to_lowercase().as_str() {
        "inactivo" | "inactive" => EmployeeStatus::Inactive,
        _ => EmployeeStatus::Active,
    }
}
