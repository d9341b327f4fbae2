//! `hhrr-recon`: employee batch reconciliation engine.
//!
//! Pure engine crate: receives decoded import rows and a department
//! snapshot, drives an [`EmployeeStore`], returns an [`ImportReport`].
//! No file, spreadsheet or database dependencies.

pub mod cancel;
pub mod config;
pub mod department;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod store;
pub mod validate;

pub use cancel::CancelToken;
pub use config::ImportConfig;
pub use department::DepartmentIndex;
pub use engine::{run, Reconciler};
pub use error::{ConfigError, ParseError, StoreError};
pub use model::{Department, EmployeeRecord, EmployeeStatus, NewEmployee, RawImportRow};
pub use report::{ImportReport, ImportSummary, IssueReason, RowAction, RowIssue};
pub use store::{DepartmentSource, EmployeeStore, MemoryStore, SpreadsheetParser};
