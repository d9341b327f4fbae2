use serde::Serialize;

use crate::config::UnresolvedDepartmentMode;

// ---------------------------------------------------------------------------
// Row issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueReason {
    EmptyEmail,
    UnresolvedDepartment,
    MissingName,
    InvalidEmail,
    NonPositiveSalary,
    StoreLookupFailed,
    StoreWriteFailed,
}

impl std::fmt::Display for IssueReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EmptyEmail => "empty_email",
            Self::UnresolvedDepartment => "unresolved_department",
            Self::MissingName => "missing_name",
            Self::InvalidEmail => "invalid_email",
            Self::NonPositiveSalary => "non_positive_salary",
            Self::StoreLookupFailed => "store_lookup_failed",
            Self::StoreWriteFailed => "store_write_failed",
        };
        f.write_str(s)
    }
}

/// A row that was skipped or rejected. Rows with a blank email are
/// identified by `row_number` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub reason: IssueReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// ---------------------------------------------------------------------------
// Applied rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Inserted,
    Updated,
    /// Later row for an email already written earlier in the same batch.
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRow {
    pub row_number: usize,
    pub email: String,
    pub action: RowAction,
    pub employee_id: i64,
    pub department_id: i64,
    /// The row's department name did not resolve and a fallback (default
    /// department, or the employee's current one) was used.
    pub department_fallback: bool,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Counts are per employee: an email inserted by this batch counts once as
/// inserted no matter how many rows carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows_total: usize,
    pub inserted: usize,
    pub updated: usize,
    pub merged_duplicates: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub unprocessed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub unresolved_departments: String,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub meta: ImportMeta,
    pub summary: ImportSummary,
    pub applied: Vec<AppliedRow>,
    pub skipped: Vec<RowIssue>,
    pub rejected: Vec<RowIssue>,
}

impl ImportReport {
    pub(crate) fn new(config_name: &str, mode: UnresolvedDepartmentMode, run_at: String, rows_total: usize) -> Self {
        Self {
            meta: ImportMeta {
                config_name: config_name.to_string(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at,
                unresolved_departments: mode.to_string(),
                cancelled: false,
            },
            summary: ImportSummary {
                rows_total,
                ..ImportSummary::default()
            },
            applied: Vec::new(),
            skipped: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub(crate) fn skip(&mut self, issue: RowIssue) {
        self.summary.skipped += 1;
        self.skipped.push(issue);
    }

    pub(crate) fn reject(&mut self, issue: RowIssue) {
        self.summary.rejected += 1;
        self.rejected.push(issue);
    }

    pub(crate) fn apply(&mut self, row: AppliedRow) {
        match row.action {
            RowAction::Inserted => self.summary.inserted += 1,
            RowAction::Updated => self.summary.updated += 1,
            RowAction::Merged => self.summary.merged_duplicates += 1,
        }
        self.applied.push(row);
    }

    /// True when every visited row was written or skipped.
    pub fn is_clean(&self) -> bool {
        self.summary.rejected == 0 && !self.meta.cancelled
    }

    pub fn rejected_for(&self, reason: IssueReason) -> impl Iterator<Item = &RowIssue> {
        self.rejected.iter().filter(move |i| i.reason == reason)
    }
}
