use thiserror::Error;

/// Import config could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config validation error (bad column number, blank default, etc.).
    #[error("config validation error: {0}")]
    Validation(String),
}

/// A spreadsheet could not be decoded into rows.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot open spreadsheet: {0}")]
    Open(String),
    #[error("worksheet {index} not found (workbook has {available})")]
    NoWorksheet { index: usize, available: usize },
    #[error("cannot read worksheet '{sheet}': {message}")]
    Worksheet { sheet: String, message: String },
    #[error("CSV error at line {line}: {message}")]
    Csv { line: u64, message: String },
    #[error("worksheet '{sheet}' has {rows} data rows, more than the {max} allowed")]
    TooManyRows { sheet: String, rows: usize, max: usize },
}

/// Failure reported by an employee or department store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (I/O, SQL, connection).
    #[error("store backend error: {0}")]
    Backend(String),
    /// The write violated a store constraint (duplicate email, unknown department).
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// Update targeted a record the store does not hold.
    #[error("employee {0} not found")]
    NotFound(i64),
}
