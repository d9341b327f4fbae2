// Employee store on SQLite

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use rust_decimal::Decimal;
use tracing::debug;

use hhrr_recon::{
    Department, DepartmentSource, EmployeeRecord, EmployeeStatus, EmployeeStore, NewEmployee,
    StoreError,
};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    job_title TEXT NOT NULL,
    salary TEXT NOT NULL,          -- decimal as text, e.g. "2500.50"
    hiring_date TEXT NOT NULL,     -- YYYY-MM-DD
    department_id INTEGER NOT NULL REFERENCES departments(id),
    status TEXT NOT NULL,          -- active | inactive
    created_at TEXT NOT NULL       -- RFC 3339, UTC
);
"#;

/// Departments created by `seed_default_departments` on an empty database.
pub const DEFAULT_DEPARTMENTS: &[(&str, &str)] = &[
    ("General", "General"),
    ("Logístic", "Supply chain management"),
    ("Marketing", "Advertising and branding"),
    ("R.R.H.H", "Human talent management"),
    ("Operations", "Central processes"),
    ("Sales", "Commercial strategies"),
    ("Technology", "Systems and development"),
    ("Accounting", "Finance and audit"),
];

const SELECT_EMPLOYEE: &str = "SELECT id, name, email, job_title, salary, hiring_date, department_id, status, created_at FROM employees";

pub struct SqliteStore {
    conn: Connection,
}

fn store_err(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
            StoreError::Constraint(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => StoreError::Backend(e.to_string()),
    }
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(store_err)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(store_err)?;
        Ok(Self { conn })
    }

    /// Insert [`DEFAULT_DEPARTMENTS`] if there are no departments yet.
    /// Returns how many were inserted.
    pub fn seed_default_departments(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM departments", [], |r| r.get(0))
            .map_err(store_err)?;
        if count > 0 {
            return Ok(0);
        }
        for (name, description) in DEFAULT_DEPARTMENTS {
            self.add_department(name, description)?;
        }
        Ok(DEFAULT_DEPARTMENTS.len())
    }

    pub fn add_department(&self, name: &str, description: &str) -> Result<i64, StoreError> {
        self.conn
            .execute(
                "INSERT INTO departments (name, description) VALUES (?1, ?2)",
                params![name, description],
            )
            .map_err(store_err)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn employee_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM employees", [], |r| r.get(0))
            .map_err(store_err)?;
        Ok(count as usize)
    }

    pub fn list_employees(&self) -> Result<Vec<EmployeeRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_EMPLOYEE} ORDER BY id"))
            .map_err(store_err)?;
        let raws = stmt
            .query_map([], RawEmployee::from_row)
            .map_err(store_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(store_err)?;
        raws.into_iter().map(RawEmployee::into_record).collect()
    }

    /// Open a transaction spanning the whole run; pair with [`Self::rollback_dry_run`].
    pub fn begin_dry_run(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("BEGIN").map_err(store_err)
    }

    pub fn rollback_dry_run(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("ROLLBACK").map_err(store_err)
    }
}

impl DepartmentSource for SqliteStore {
    fn list_all(&self) -> Result<Vec<Department>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM departments ORDER BY id")
            .map_err(store_err)?;
        let departments = stmt
            .query_map([], |r| {
                Ok(Department {
                    id: r.get(0)?,
                    name: r.get(1)?,
                })
            })
            .map_err(store_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(store_err)?;
        Ok(departments)
    }
}

impl EmployeeStore for SqliteStore {
    fn find_by_email(&self, email: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{SELECT_EMPLOYEE} WHERE email = ?1"))
            .map_err(store_err)?;
        let raw = stmt
            .query_row(params![email], RawEmployee::from_row)
            .optional()
            .map_err(store_err)?;
        raw.map(RawEmployee::into_record).transpose()
    }

    fn insert(&mut self, employee: NewEmployee) -> Result<i64, StoreError> {
        self.conn
            .execute(
                "INSERT INTO employees (name, email, job_title, salary, hiring_date, department_id, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    employee.name,
                    employee.email,
                    employee.job_title,
                    employee.salary.to_string(),
                    employee.hiring_date.format("%Y-%m-%d").to_string(),
                    employee.department_id,
                    employee.status.as_str(),
                    employee.created_at.to_rfc3339(),
                ],
            )
            .map_err(store_err)?;
        let id = self.conn.last_insert_rowid();
        debug!(id, email = %employee.email, "inserted employee row");
        Ok(id)
    }

    fn update(&mut self, employee: &EmployeeRecord) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE employees
                 SET name = ?1, email = ?2, job_title = ?3, salary = ?4, hiring_date = ?5,
                     department_id = ?6, status = ?7
                 WHERE id = ?8",
                params![
                    employee.name,
                    employee.email,
                    employee.job_title,
                    employee.salary.to_string(),
                    employee.hiring_date.format("%Y-%m-%d").to_string(),
                    employee.department_id,
                    employee.status.as_str(),
                    employee.id,
                ],
            )
            .map_err(store_err)?;
        if changed == 0 {
            return Err(StoreError::NotFound(employee.id));
        }
        Ok(())
    }
}

/// Column values as stored, before text fields are parsed back.
struct RawEmployee {
    id: i64,
    name: String,
    email: String,
    job_title: String,
    salary: String,
    hiring_date: String,
    department_id: i64,
    status: String,
    created_at: String,
}

impl RawEmployee {
    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            name: r.get(1)?,
            email: r.get(2)?,
            job_title: r.get(3)?,
            salary: r.get(4)?,
            hiring_date: r.get(5)?,
            department_id: r.get(6)?,
            status: r.get(7)?,
            created_at: r.get(8)?,
        })
    }

    fn into_record(self) -> Result<EmployeeRecord, StoreError> {
        let bad = |field: &str, value: &str| {
            StoreError::Backend(format!("employee {}: bad {field} '{value}'", self.id))
        };
        let salary = Decimal::from_str(&self.salary).map_err(|_| bad("salary", &self.salary))?;
        let hiring_date = NaiveDate::parse_from_str(&self.hiring_date, "%Y-%m-%d")
            .map_err(|_| bad("hiring_date", &self.hiring_date))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|_| bad("created_at", &self.created_at))?
            .with_timezone(&Utc);
        Ok(EmployeeRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            job_title: self.job_title,
            salary,
            hiring_date,
            department_id: self.department_id,
            status: EmployeeStatus::from_str_lossy(&self.status),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_employee(email: &str, department_id: i64) -> NewEmployee {
        NewEmployee {
            name: "Ana Pérez".into(),
            email: email.into(),
            job_title: "Analyst".into(),
            salary: Decimal::new(250_050, 2),
            hiring_date: NaiveDate::from_ymd_opt(2023, 3, 14).unwrap(),
            department_id,
            status: EmployeeStatus::Active,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn seed_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.seed_default_departments().unwrap(), 8);
        assert_eq!(store.seed_default_departments().unwrap(), 0);
        let depts = store.list_all().unwrap();
        assert_eq!(depts.len(), 8);
        assert_eq!(depts[0].name, "General");
        assert_eq!(depts[0].id, 1);
    }

    #[test]
    fn insert_then_find_round_trips_fields() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.seed_default_departments().unwrap();
        let id = store.insert(new_employee("ana@x.com", 6)).unwrap();

        let rec = store.find_by_email("ana@x.com").unwrap().unwrap();
        assert_eq!(rec, new_employee("ana@x.com", 6).with_id(id));
        assert!(store.find_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_and_unknown_department_are_constraint_errors() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.seed_default_departments().unwrap();
        store.insert(new_employee("ana@x.com", 1)).unwrap();

        assert!(matches!(store.insert(new_employee("ana@x.com", 1)), Err(StoreError::Constraint(_))));
        assert!(matches!(store.insert(new_employee("bob@x.com", 99)), Err(StoreError::Constraint(_))));
        assert_eq!(store.employee_count().unwrap(), 1);
    }

    #[test]
    fn update_changes_row_and_reports_missing_id() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.seed_default_departments().unwrap();
        let id = store.insert(new_employee("ana@x.com", 1)).unwrap();

        let mut rec = store.find_by_email("ana@x.com").unwrap().unwrap();
        rec.job_title = "Lead".into();
        rec.department_id = 3;
        store.update(&rec).unwrap();
        assert_eq!(store.find_by_email("ana@x.com").unwrap().unwrap(), rec);

        let mut ghost = rec.clone();
        ghost.id = id + 100;
        assert!(matches!(store.update(&ghost), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn dry_run_rolls_back_writes() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.seed_default_departments().unwrap();
        store.begin_dry_run().unwrap();
        store.insert(new_employee("ana@x.com", 1)).unwrap();
        assert_eq!(store.employee_count().unwrap(), 1);
        store.rollback_dry_run().unwrap();
        assert_eq!(store.employee_count().unwrap(), 0);
    }

    #[test]
    fn reopening_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hr.sqlite");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.seed_default_departments().unwrap();
            store.insert(new_employee("ana@x.com", 2)).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.list_employees().unwrap().len(), 1);
        assert_eq!(store.list_all().unwrap().len(), 8);
    }
}
