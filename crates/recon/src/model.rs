use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "inactive" => Self::Inactive,
            _ => Self::Active,
        }
    }
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded spreadsheet row, before validation or department lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImportRow {
    /// 1-based row number in the source sheet (header included).
    pub row_number: usize,
    pub name: String,
    pub email: String,
    pub job_title: String,
    pub salary: Decimal,
    pub hiring_date: NaiveDate,
    pub department_name: String,
    pub status: EmployeeStatus,
}

// ---------------------------------------------------------------------------
// Store-owned records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub job_title: String,
    pub salary: Decimal,
    pub hiring_date: NaiveDate,
    pub department_id: i64,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

/// An employee about to be inserted. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub job_title: String,
    pub salary: Decimal,
    pub hiring_date: NaiveDate,
    pub department_id: i64,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

impl NewEmployee {
    pub fn with_id(self, id: i64) -> EmployeeRecord {
        EmployeeRecord {
            id,
            name: self.name,
            email: self.email,
            job_title: self.job_title,
            salary: self.salary,
            hiring_date: self.hiring_date,
            department_id: self.department_id,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

impl EmployeeRecord {
    /// Overwrite the fields an import is allowed to change.
    ///
    /// `department_id` of `None` keeps the current department. Status and
    /// creation time are never touched.
    pub fn apply_import(&mut self, row: &RawImportRow, department_id: Option<i64>) {
        self.name = row.name.clone();
        self.job_title = row.job_title.clone();
        self.salary = row.salary;
        self.hiring_date = row.hiring_date;
        if let Some(id) = department_id {
            self.department_id = id;
        }
    }
}
