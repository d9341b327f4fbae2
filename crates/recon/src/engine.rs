use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::{BlankEmailMode, ImportConfig, UnresolvedDepartmentMode};
use crate::department::DepartmentIndex;
use crate::model::{Department, EmployeeRecord, EmployeeStatus, NewEmployee, RawImportRow};
use crate::report::{AppliedRow, ImportReport, IssueReason, RowAction, RowIssue};
use crate::store::EmployeeStore;
use crate::validate::check_row;

pub type Clock = fn() -> DateTime<Utc>;

/// Run one import batch with the wall clock. See [`Reconciler::run`].
pub fn run<S: EmployeeStore + ?Sized>(
    config: &ImportConfig,
    rows: &[RawImportRow],
    departments: &[Department],
    store: &mut S,
    cancel: &CancelToken,
) -> ImportReport {
    Reconciler::new(config).run(rows, departments, store, cancel)
}

pub struct Reconciler<'a> {
    config: &'a ImportConfig,
    clock: Clock,
}

/// Outcome of department lookup for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Direct(i64),
    Fallback(i64),
    /// Fallback mode with an empty snapshot: updates keep the current id.
    NoDefault,
}

impl Resolution {
    fn id(self) -> Option<i64> {
        match self {
            Self::Direct(id) | Self::Fallback(id) => Some(id),
            Self::NoDefault => None,
        }
    }
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self { config, clock: Utc::now }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Reconcile `rows` against the store, strictly in order.
    ///
    /// Each eligible row produces exactly one `insert` or `update` call.
    /// Row problems, including store failures, are recorded in the report and
    /// never stop the batch. `cancel` is polled before every row.
    pub fn run<S: EmployeeStore + ?Sized>(
        &self,
        rows: &[RawImportRow],
        departments: &[Department],
        store: &mut S,
        cancel: &CancelToken,
    ) -> ImportReport {
        let index = DepartmentIndex::new(departments);
        if index.is_empty() {
            warn!("department snapshot is empty; new employees cannot be placed");
        }
        debug!(rows = rows.len(), departments = index.len(), "reconciling batch");
        let mode = self.config.departments.unresolved;
        let mut report = ImportReport::new(
            &self.config.name,
            mode,
            (self.clock)().to_rfc3339(),
            rows.len(),
        );

        // Employees written by this batch, keyed by trimmed email.
        let mut seen: HashMap<String, EmployeeRecord> = HashMap::new();

        for (position, row) in rows.iter().enumerate() {
            if cancel.is_cancelled() {
                report.meta.cancelled = true;
                report.summary.unprocessed = rows.len() - position;
                warn!(
                    row = row.row_number,
                    unprocessed = report.summary.unprocessed,
                    "import cancelled"
                );
                break;
            }
            self.process_row(row, &index, store, &mut seen, &mut report);
        }

        let s = &report.summary;
        info!(
            config = %self.config.name,
            rows = s.rows_total,
            inserted = s.inserted,
            updated = s.updated,
            merged = s.merged_duplicates,
            skipped = s.skipped,
            rejected = s.rejected,
            "import finished"
        );
        report
    }

    fn process_row<S: EmployeeStore + ?Sized>(
        &self,
        row: &RawImportRow,
        index: &DepartmentIndex,
        store: &mut S,
        seen: &mut HashMap<String, EmployeeRecord>,
        report: &mut ImportReport,
    ) {
        let email = row.email.trim();
        if email.is_empty() {
            let issue = RowIssue {
                row_number: row.row_number,
                email: None,
                reason: IssueReason::EmptyEmail,
                detail: None,
            };
            match self.config.rows.blank_email {
                BlankEmailMode::Skip => {
                    debug!(row = row.row_number, "skipping row with blank email");
                    report.skip(issue);
                }
                BlankEmailMode::Reject => {
                    warn!(row = row.row_number, "rejecting row with blank email");
                    report.reject(issue);
                }
            }
            return;
        }

        let reject = |report: &mut ImportReport, reason: IssueReason, detail: Option<String>| {
            warn!(row = row.row_number, email, %reason, detail = detail.as_deref(), "row rejected");
            report.reject(RowIssue {
                row_number: row.row_number,
                email: Some(email.to_string()),
                reason,
                detail,
            });
        };

        if let Some(reason) = check_row(&self.config.validation, row, email) {
            reject(report, reason, None);
            return;
        }

        let policy = &self.config.departments;
        let resolution = match index.resolve(&row.department_name) {
            Some(id) => Resolution::Direct(id),
            None => match fallback_for(policy.unresolved, index, &policy.default) {
                Some(resolution) => resolution,
                None => {
                    reject(
                        report,
                        IssueReason::UnresolvedDepartment,
                        Some(format!("no department named '{}'", row.department_name.trim())),
                    );
                    return;
                }
            },
        };

        debug_assert!(
            resolution.id().map_or(true, |id| index.contains_id(id)),
            "resolved department id must come from the snapshot"
        );

        let existing = match seen.get(email) {
            Some(record) => Some((record.clone(), RowAction::Merged)),
            None => match store.find_by_email(email) {
                Ok(found) => found.map(|record| (record, RowAction::Updated)),
                Err(e) => {
                    reject(report, IssueReason::StoreLookupFailed, Some(e.to_string()));
                    return;
                }
            },
        };

        match existing {
            Some((mut record, action)) => {
                record.apply_import(row, resolution.id());
                if let Err(e) = store.update(&record) {
                    reject(report, IssueReason::StoreWriteFailed, Some(e.to_string()));
                    return;
                }
                debug!(row = row.row_number, email, id = record.id, ?action, "employee updated");
                report.apply(AppliedRow {
                    row_number: row.row_number,
                    email: email.to_string(),
                    action,
                    employee_id: record.id,
                    department_id: record.department_id,
                    department_fallback: !matches!(resolution, Resolution::Direct(_)),
                });
                seen.insert(email.to_string(), record);
            }
            None => {
                let Some(department_id) = resolution.id() else {
                    reject(
                        report,
                        IssueReason::UnresolvedDepartment,
                        Some("no default department available for a new employee".into()),
                    );
                    return;
                };
                let employee = NewEmployee {
                    name: row.name.clone(),
                    email: email.to_string(),
                    job_title: row.job_title.clone(),
                    salary: row.salary,
                    hiring_date: row.hiring_date,
                    department_id,
                    status: EmployeeStatus::Active,
                    created_at: (self.clock)(),
                };
                match store.insert(employee.clone()) {
                    Ok(id) => {
                        debug!(row = row.row_number, email, id, "employee inserted");
                        report.apply(AppliedRow {
                            row_number: row.row_number,
                            email: email.to_string(),
                            action: RowAction::Inserted,
                            employee_id: id,
                            department_id,
                            department_fallback: matches!(resolution, Resolution::Fallback(_)),
                        });
                        seen.insert(email.to_string(), employee.with_id(id));
                    }
                    Err(e) => reject(report, IssueReason::StoreWriteFailed, Some(e.to_string())),
                }
            }
        }
    }
}

/// Resolution for a row whose department name missed. `None` means reject.
fn fallback_for(
    mode: UnresolvedDepartmentMode,
    index: &DepartmentIndex,
    preferred: &str,
) -> Option<Resolution> {
    match mode {
        UnresolvedDepartmentMode::Strict => None,
        UnresolvedDepartmentMode::FallbackToDefault => Some(
            index
                .default_department(preferred)
                .map_or(Resolution::NoDefault, Resolution::Fallback),
        ),
    }
}
