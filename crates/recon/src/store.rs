//! Collaborator traits the reconciler is driven through, plus an in-memory
//! store used by tests and dry runs.

use std::collections::{BTreeMap, HashSet};

use crate::error::{ParseError, StoreError};
use crate::model::{Department, EmployeeRecord, NewEmployee, RawImportRow};

/// Decodes spreadsheet bytes into import rows, top to bottom.
pub trait SpreadsheetParser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<RawImportRow>, ParseError>;
}

pub trait DepartmentSource {
    fn list_all(&self) -> Result<Vec<Department>, StoreError>;
}

/// Employee persistence. Every call is committed on its own.
pub trait EmployeeStore {
    fn find_by_email(&self, email: &str) -> Result<Option<EmployeeRecord>, StoreError>;
    fn insert(&mut self, employee: NewEmployee) -> Result<i64, StoreError>;
    fn update(&mut self, employee: &EmployeeRecord) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    departments: Vec<Department>,
    employees: BTreeMap<i64, EmployeeRecord>,
    next_id: i64,
    failing_emails: HashSet<String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_departments(departments: Vec<Department>) -> Self {
        Self {
            departments,
            ..Self::default()
        }
    }

    /// Make every insert/update for `email` fail with a backend error.
    pub fn fail_writes_for(&mut self, email: &str) {
        self.failing_emails.insert(email.to_string());
    }

    /// Place an existing record, keeping its id.
    pub fn seed(&mut self, record: EmployeeRecord) {
        self.next_id = self.next_id.max(record.id);
        self.employees.insert(record.id, record);
    }

    pub fn employees(&self) -> impl Iterator<Item = &EmployeeRecord> {
        self.employees.values()
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Successful insert + update calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn check_failure(&self, email: &str) -> Result<(), StoreError> {
        if self.failing_emails.contains(email) {
            return Err(StoreError::Backend(format!("injected write failure for {email}")));
        }
        Ok(())
    }
}

impl DepartmentSource for MemoryStore {
    fn list_all(&self) -> Result<Vec<Department>, StoreError> {
        Ok(self.departments.clone())
    }
}

impl EmployeeStore for MemoryStore {
    fn find_by_email(&self, email: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        Ok(self.employees.values().find(|e| e.email == email).cloned())
    }

    fn insert(&mut self, employee: NewEmployee) -> Result<i64, StoreError> {
        self.check_failure(&employee.email)?;
        if self.employees.values().any(|e| e.email == employee.email) {
            return Err(StoreError::Constraint(format!("duplicate email {}", employee.email)));
        }
        if !self.departments.iter().any(|d| d.id == employee.department_id) {
            return Err(StoreError::Constraint(format!(
                "unknown department {}",
                employee.department_id
            )));
        }
        self.next_id += 1;
        let id = self.next_id;
        self.employees.insert(id, employee.with_id(id));
        self.writes += 1;
        Ok(id)
    }

    fn update(&mut self, employee: &EmployeeRecord) -> Result<(), StoreError> {
        self.check_failure(&employee.email)?;
        if !self.departments.iter().any(|d| d.id == employee.department_id) {
            return Err(StoreError::Constraint(format!(
                "unknown department {}",
                employee.department_id
            )));
        }
        let slot = self
            .employees
            .get_mut(&employee.id)
            .ok_or(StoreError::NotFound(employee.id))?;
        *slot = employee.clone();
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EmployeeStatus;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn new_employee(email: &str, department_id: i64) -> NewEmployee {
        NewEmployee {
            name: "Ana Pérez".into(),
            email: email.into(),
            job_title: "Analyst".into(),
            salary: Decimal::new(250_000, 2),
            hiring_date: NaiveDate::from_ymd_opt(2023, 5, 2).unwrap(),
            department_id,
            status: EmployeeStatus::Active,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::with_departments(vec![Department { id: 1, name: "Sales".into() }])
    }

    #[test]
    fn insert_assigns_ids_and_finds_by_email() {
        let mut s = store();
        let a = s.insert(new_employee("a@x.com", 1)).unwrap();
        let b = s.insert(new_employee("b@x.com", 1)).unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(s.find_by_email("b@x.com").unwrap().unwrap().id, 2);
        assert!(s.find_by_email("c@x.com").unwrap().is_none());
        assert_eq!(s.write_count(), 2);
    }

    #[test]
    fn insert_rejects_duplicate_email_and_unknown_department() {
        let mut s = store();
        s.insert(new_employee("a@x.com", 1)).unwrap();
        assert!(matches!(s.insert(new_employee("a@x.com", 1)), Err(StoreError::Constraint(_))));
        assert!(matches!(s.insert(new_employee("z@x.com", 42)), Err(StoreError::Constraint(_))));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn injected_failure_only_hits_that_email() {
        let mut s = store();
        s.fail_writes_for("bad@x.com");
        assert!(matches!(s.insert(new_employee("bad@x.com", 1)), Err(StoreError::Backend(_))));
        assert!(s.insert(new_employee("ok@x.com", 1)).is_ok());
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut s = store();
        let ghost = new_employee("g@x.com", 1).with_id(77);
        assert!(matches!(s.update(&ghost), Err(StoreError::NotFound(77))));
    }

    #[test]
    fn seed_keeps_id_and_advances_counter() {
        let mut s = store();
        s.seed(new_employee("old@x.com", 1).with_id(10));
        let id = s.insert(new_employee("new@x.com", 1)).unwrap();
        assert_eq!(id, 11);
    }
}
